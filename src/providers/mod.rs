//! Built-in provider implementations
//!
//! One module per identity provider. All but Steam implement
//! [`crate::provider::OAuth2Provider`]; Steam speaks OpenID 2.0 and carries
//! its own flow.

mod constant_contact;
mod eveonline;
mod gitee;
mod live;
mod product_hunt;
mod steam;
mod zendesk;

pub use constant_contact::ConstantContact;
pub use eveonline::Eveonline;
pub use gitee::Gitee;
pub use live::Live;
pub use product_hunt::ProductHunt;
pub use steam::Steam;
pub use zendesk::Zendesk;
