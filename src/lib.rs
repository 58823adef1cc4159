//! magedeploy - Magento module deployment engine
//!
//! Deploys `magento-module` composer packages from the vendor directory into
//! a target Magento application root. The host package manager resolves,
//! fetches, and extracts packages; this crate owns what happens next: for
//! each package it selects a deploy strategy and a file-mapping parser,
//! resolves the package's source-to-destination mapping, and places (or
//! removes) the files.
//!
//! # Architecture Overview
//!
//! The engine is a pipeline of three decisions per package:
//!
//! 1. **Selection** ([`selector`]) - pick the deploy strategy (per-package
//!    project override, then the package's own declaration, then the project
//!    default, then `copy`) and detect the mapping source (explicit map,
//!    `modman` file, `package.xml` manifest - probed in that order).
//! 2. **Parsing** ([`mapping`]) - produce the resolved mapping: an ordered,
//!    destination-deduplicated list of source-to-destination pairs.
//! 3. **Placement** ([`deploy`]) - run the strategy over the mapping and log
//!    every file placed; removal replays that log in reverse.
//!
//! The [`installer`] module orchestrates the pipeline across the composer
//! lifecycle (install, update, uninstall) and across batches, and [`state`]
//! persists each package's deploy log at the application root so uninstalls
//! in later process runs delete exactly what was placed.
//!
//! # Core Modules
//!
//! - [`core`] - error taxonomy and shared types
//! - [`package`] - package identity and typed `extra` metadata
//! - [`composer`] - reading `composer.json` and `installed.json`
//! - [`config`] - validated project-level configuration
//! - [`selector`] - strategy and parser selection
//! - [`mapping`] - the three mapping parsers
//! - [`deploy`] - the four deploy strategies
//! - [`installer`] - lifecycle orchestration and batch reporting
//! - [`state`] - the persistent deploy state file
//! - [`cli`] - the `magedeploy` command-line driver
//! - [`utils`] - file system helpers
//!
//! # Configuration (root composer.json)
//!
//! ```json
//! {
//!     "extra": {
//!         "magento-root-dir": "htdocs",
//!         "magento-deploystrategy": "symlink",
//!         "magento-deploystrategy-overwrite": {
//!             "acme/widget": "copy"
//!         },
//!         "magento-map-overwrite": {
//!             "acme/widget": {
//!                 "app/code/Foo.php": "app/code/local/Foo.php"
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Deploy every installed magento-module package
//! magedeploy deploy
//!
//! # Deploy one package, verbosely
//! magedeploy deploy acme/widget --verbose
//!
//! # Show resolution and deploy state
//! magedeploy list
//!
//! # Remove deployed packages
//! magedeploy undeploy
//! ```

pub mod cli;
pub mod composer;
pub mod config;
pub mod core;
pub mod deploy;
pub mod installer;
pub mod mapping;
pub mod package;
pub mod selector;
pub mod state;
pub mod utils;
