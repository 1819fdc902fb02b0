#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use vamp_router_controller_client as client;
pub use vamp_router_controller_k8s_api as k8s;
pub use vamp_router_controller_k8s_routing as routing;

mod args;

pub use self::args::Args;
