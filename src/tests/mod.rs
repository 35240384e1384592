// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod certificate_tests;
pub mod lookup_tests;
