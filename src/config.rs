// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::param::DEFAULT_NOT_FOUND_MESSAGE;

/// 配置文件中声明的一条路由。
///
/// 三个字段都保留为原始的 TOML 值，类型检查交给
/// [`Router::load_routes`](crate::Router::load_routes)，以便给出与代码注册一致的错误。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RouteEntry {
    #[serde(default)]
    pub method: Option<toml::Value>,
    #[serde(default)]
    pub url: Option<toml::Value>,
    #[serde(default)]
    pub handler: Option<toml::Value>,
}

impl RouteEntry {
    pub fn new(method: &str, url: &str, handler: &str) -> Self {
        Self {
            method: Some(toml::Value::String(method.to_string())),
            url: Some(toml::Value::String(url.to_string())),
            handler: Some(toml::Value::String(handler.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_not_found_message")]
    not_found_message: String,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

fn default_port() -> u16 {
    7878
}

fn default_local() -> bool {
    true
}

fn default_not_found_message() -> String {
    DEFAULT_NOT_FOUND_MESSAGE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: default_port(),
            local: default_local(),
            worker_threads: num_cpus::get(),
            not_found_message: default_not_found_message(),
            routes: Vec::new(),
        }
    }

    /// 从 TOML 文件读取配置；文件不存在或内容无法解析时使用默认配置。
    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                error!("无法打开配置文件{}：{}，使用默认配置", filename, e);
                return Config::new();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("无法读取配置文件{}：{}，使用默认配置", filename, e);
            return Config::new();
        }
        Self::from_toml_str(&str_val)
    }

    /// 从 TOML 文本构建配置。
    pub fn from_toml_str(content: &str) -> Self {
        let mut raw_config: Config = match toml::from_str(content) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象（{}），使用默认配置", e);
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.not_found_message.is_empty() {
            warn!("not_found_message被设置为空串，404响应将没有正文");
        }
        raw_config
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn not_found_message(&self) -> &str {
        &self.not_found_message
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }
}
