pub use stations_models::account::{Account, NewAccount, TokenResponse};
