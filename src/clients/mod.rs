//! Type-safe wrappers around [`SliceClient`](crate::framework::SliceClient).
//!
//! Each resource gets a `<Resource>Client` implementing [`ResourceClient`], plus domain
//! helpers where the back office needs them (publishing posts, paging the media library,
//! invoice history, ...). [`AuthClient`] handles sign-in and sign-out.

/// Declares `<Resource>Client`, a cloneable wrapper implementing [`ResourceClient`].
macro_rules! resource_client {
    ($(#[$meta:meta])* $resource:ident) => {
        paste::paste! {
            $(#[$meta])*
            #[derive(Clone)]
            pub struct [<$resource Client>] {
                inner: $crate::framework::SliceClient<$crate::model::$resource>,
            }

            impl [<$resource Client>] {
                pub fn new(inner: $crate::framework::SliceClient<$crate::model::$resource>) -> Self {
                    Self { inner }
                }
            }

            impl $crate::clients::ResourceClient<$crate::model::$resource> for [<$resource Client>] {
                fn inner(&self) -> &$crate::framework::SliceClient<$crate::model::$resource> {
                    &self.inner
                }
            }
        }
    };
}

pub mod auth_client;
pub mod invoice_client;
pub mod media_client;
pub mod post_client;
pub mod product_discount_client;
pub mod resources;
pub mod traits;
pub mod user_client;

pub use auth_client::*;
pub use invoice_client::*;
pub use media_client::*;
pub use post_client::*;
pub use product_discount_client::*;
pub use resources::*;
pub use traits::*;
pub use user_client::*;
