mod dashboard;
mod health;
mod links;
mod redirect;

pub use dashboard::dashboard_handler;
pub use health::health_handler;
pub use links::{collision_metrics_handler, create_link_handler};
pub use redirect::{redirect_handler, url_info_handler};
