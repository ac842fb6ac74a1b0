//! Typed option/response contracts, one module per hook point.
//!
//! Records are generic (`T`, defaulting to `serde_json::Value`) so typed
//! scripts can deserialize pages into their own structs while the host
//! carries them as JSON.

pub mod branching;
pub mod filter;
pub mod flow_router;
pub mod form_init;
pub mod handle_request;
pub mod post_aggregate;
pub mod post_map;
pub mod post_response_map;
pub mod post_submit;
pub mod pre_map;
pub mod pre_save_page;
pub mod transform;
