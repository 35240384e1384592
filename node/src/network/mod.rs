// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod agent;
pub mod api_client;

pub use agent::ReplicaClient;
pub use api_client::{IndexApiClient, RecordSource};
