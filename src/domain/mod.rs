// Domain layer - Pure data and evaluation rules
pub mod bounded;
pub mod prediction;
pub mod reading;
pub mod record;
pub mod status;
pub mod thresholds;
pub mod warning;
