pub mod audit;
pub mod block;
pub mod contact;
pub mod interaction;
pub mod reference;
pub mod user;
pub mod watchlist;
