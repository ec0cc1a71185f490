//! Telegram 网关适配器

pub mod grammers_gateway;
pub mod mock_gateway;

pub use grammers_gateway::{GrammersGateway, GrammersGatewayConfig};
pub use mock_gateway::{MockAuthGateway, MockGatewayConfig};
