use crate::config::AnalyzerConfig;

pub fn setup_logging(config: &AnalyzerConfig) {
    common::setup_logging(config.environment);
}
