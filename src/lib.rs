// Library exports for testing
pub mod encoding;
pub mod export;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod reactions;
pub mod renderer;
pub mod stats;
pub mod stats_builder;
pub mod timefmt;
pub mod tokenize;
pub mod window;
