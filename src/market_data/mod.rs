// Market data boundary - candles, fixtures, market descriptors

pub mod candles;
pub mod csv_loader;
pub mod market;

pub use candles::{Candle, CandleSet};
pub use market::MarketDescriptor;
