// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

pub mod config;
pub mod exception;
pub mod handler;
pub mod param;
pub mod pattern;
pub mod request;
pub mod response;
pub mod router;

pub use config::{Config, RouteEntry};
pub use exception::{Exception, ExceptionKind};
pub use handler::{Callback, Handler, HandlerRegistry, IntoCallback};
pub use param::HttpRequestMethod;
pub use pattern::Params;
pub use request::Request;
pub use response::Response;
pub use router::{Resolved, Route, RouteTable, Router};
