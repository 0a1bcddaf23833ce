pub mod helpers;
mod mocks;

mod reviews;
mod users;
