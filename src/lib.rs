// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod daily;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod risk;
pub mod session;
pub mod state;
pub mod utils;
