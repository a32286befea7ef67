mod authoring_service;
mod click_service;
mod code_allocator;
mod dashboard_service;
mod geoip_service;
mod redirect_service;
mod token_service;

pub use authoring_service::{AuthoringService, CreateLinkInput};
pub use click_service::ClickService;
pub use code_allocator::CodeAllocator;
pub use dashboard_service::DashboardService;
pub use geoip_service::GeoIpService;
pub use redirect_service::RedirectService;
pub use token_service::TokenVerifier;
