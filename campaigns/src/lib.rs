//! Campaign configuration, content validation and the two request-time
//! resolvers: affiliate redirects and locale content.

pub mod config;
pub mod content;
pub mod errors;
pub mod redirect;
pub mod registry;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use errors::{ConfigError, ResolveError};
pub use redirect::RedirectOutcome;
pub use registry::{Campaign, CampaignRegistry, Destination, DestinationOrigin};
