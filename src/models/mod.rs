mod listing;
mod response;

pub use listing::{
    Condition, Listing, Price, RawData, Returns, Seller, Shipping, ShippingMethod, Signals,
    Source, Specs,
};
pub use response::{SearchResponse, TokenResponse};
