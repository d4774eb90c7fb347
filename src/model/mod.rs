//! Record types and their [`Resource`](crate::framework::Resource) descriptors.
//!
//! | Slice | Endpoint prefix | List key | Writes | Lists |
//! |-------|-----------------|----------|--------|-------|
//! | `brand` | `brands` | `brands` | refetch | replace |
//! | `category` | `categories` | `categories` | refetch | replace |
//! | `product` | `products` | `products` | refetch | replace |
//! | `discount` | `discounts` | `discounts` | refetch | replace |
//! | `product_discount` | `product-discounts` | `productDiscounts` | refetch | replace |
//! | `invoice` | `invoices` | `invoices` | refetch | replace |
//! | `contact` | `contacts` | `contacts` | refetch | replace |
//! | `page` | `pages` | `pages` | refetch | replace |
//! | `post` | `posts` | `posts` | local patch | replace (paged) |
//! | `media` | `media` | `media` | local patch | append |
//! | `role` | `roles` | `roles` | refetch | replace |
//! | `user` | `users` | `users` | refetch | replace |

pub mod brand;
pub mod category;
pub mod contact;
pub mod discount;
pub mod invoice;
pub mod media;
pub mod page;
pub mod post;
pub mod product;
pub mod product_discount;
pub mod role;
pub mod user;

pub use brand::*;
pub use category::*;
pub use contact::*;
pub use discount::*;
pub use invoice::*;
pub use media::*;
pub use page::*;
pub use post::*;
pub use product::*;
pub use product_discount::*;
pub use role::*;
pub use user::*;
