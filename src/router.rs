// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由模块
//!
//! `Router` 为 DELETE、GET、PATCH、POST、PUT 各维护一张路由表。
//!
//! ## 注册
//! 通过 `get`/`post` 等入口注册 URL 模式与处理函数。模式被编译为正则表达式，
//! 其源码作为路由表中的键；同一个键再次注册时原地覆盖，保持原来的位置。
//!
//! ## 分发
//! [`Router::dispatch`] 按注册顺序逐个尝试请求方法对应的路由表，第一个匹配的路由胜出，
//! 提取出的路径参数写入 `request.params` 后调用处理函数。
//! 没有任何路由匹配（包括方法根本没有路由表）时，调用兜底处理函数返回 404。
//!
//! 匹配对象是原始的 URL，查询字符串不会被剥离：`/users` 不匹配 `/users?page=2`。

use log::{debug, error};

use crate::{
    config::RouteEntry,
    exception::Exception,
    handler::{Callback, Handler, HandlerRegistry, IntoCallback},
    param::{HttpRequestMethod, DEFAULT_NOT_FOUND_MESSAGE},
    pattern::{self, Key, Params, PathPattern},
    request::Request,
    response::Response,
};

/// 路由表中的一项：原始 URL 模式、编译结果以及处理函数。
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    compiled: PathPattern,
    handler: Handler,
}

impl Route {
    /// 规范化之后的 URL 模式
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 正则表达式源码，即路由表的键
    pub fn source(&self) -> &str {
        self.compiled.source()
    }

    pub fn keys(&self) -> &[Key] {
        self.compiled.keys()
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// 匹配路径并提取参数
    pub fn captures(&self, path: &str) -> Option<Params> {
        self.compiled.captures(path)
    }
}

/// 单个 HTTP 方法的路由表，保持插入顺序。
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// 插入路由；已存在相同键时替换，位置不变。
    fn insert(&mut self, route: Route) {
        match self.routes.iter_mut().find(|r| r.source() == route.source()) {
            Some(existing) => {
                debug!("路由{}覆盖了已注册的{}", route.pattern, existing.pattern);
                *existing = route;
            }
            None => self.routes.push(route),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.source() == key)
    }

    /// 按插入顺序遍历路由
    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    /// 按插入顺序列出所有键
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(Route::source)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// 路由查找的结果。
#[derive(Debug)]
pub enum Resolved<'r> {
    /// 命中的路由以及提取出的参数
    Found { route: &'r Route, params: Params },
    /// 没有可用的路由，应当交给兜底处理函数
    NotFound,
}

/// HTTP 请求路由器。
#[derive(Debug, Clone)]
pub struct Router {
    tables: [RouteTable; 5],
    not_found_message: String,
    not_found: Handler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_register {
    ($name:ident, $method:expr, $label:literal) => {
        #[doc = concat!("注册 `", $label, "` 路由。")]
        pub fn $name<Args>(
            &mut self,
            url: &str,
            callback: impl IntoCallback<Args>,
        ) -> Result<(), Exception> {
            let callback = callback.into_callback();
            check_callback(&callback)?;
            self.register_callback($method, url, callback)
        }
    };
}

impl Router {
    /// 创建路由器，找不到路由时返回 `"not found"`。
    pub fn new() -> Self {
        Self::with_not_found_message(DEFAULT_NOT_FOUND_MESSAGE)
    }

    /// 创建路由器并指定 404 响应的正文。
    pub fn with_not_found_message(message: &str) -> Self {
        Self {
            tables: Default::default(),
            not_found_message: message.to_string(),
            not_found: Handler::not_found(message),
        }
    }

    pub fn not_found_message(&self) -> &str {
        &self.not_found_message
    }

    method_register!(delete, HttpRequestMethod::Delete, "DELETE");
    method_register!(get, HttpRequestMethod::Get, "GET");
    method_register!(patch, HttpRequestMethod::Patch, "PATCH");
    method_register!(post, HttpRequestMethod::Post, "POST");
    method_register!(put, HttpRequestMethod::Put, "PUT");

    /// 以字符串形式的方法名注册路由，方法名大小写不敏感。
    pub fn register<Args>(
        &mut self,
        method: &str,
        url: &str,
        callback: impl IntoCallback<Args>,
    ) -> Result<(), Exception> {
        let callback = callback.into_callback();
        check_callback(&callback)?;
        let method = parse_method(method)?;
        self.register_callback(method, url, callback)
    }

    /// 回调已经由调用方检查过，这里只负责 URL 的规范化与编译。
    fn register_callback(
        &mut self,
        method: HttpRequestMethod,
        url: &str,
        callback: Callback,
    ) -> Result<(), Exception> {
        let result = pattern::normalize(url).and_then(|normalized| {
            let compiled = PathPattern::compile(&normalized)?;
            Ok(Route { pattern: normalized, compiled, handler: callback.handler().clone() })
        });
        match result {
            Ok(route) => {
                debug!("注册路由 {} {} -> {}", method, route.pattern, route.source());
                self.tables[method.index()].insert(route);
                Ok(())
            }
            Err(e) => {
                error!("注册路由 {} {:?} 失败：{}", method, url, e);
                Err(e)
            }
        }
    }

    /// 依次注册配置文件中声明的路由，遇到第一个错误即停止。
    ///
    /// 返回成功注册的路由数量。
    pub fn load_routes(
        &mut self,
        entries: &[RouteEntry],
        registry: &HandlerRegistry,
    ) -> Result<usize, Exception> {
        for entry in entries {
            let callback = match &entry.handler {
                Some(toml::Value::String(name)) => match registry.get(name) {
                    Some(callback) => callback.clone(),
                    None => return Err(not_callable(format!("unregistered handler {:?}", name))),
                },
                Some(other) => return Err(not_callable(other.to_string())),
                None => return Err(not_callable("nothing".to_string())),
            };
            check_callback(&callback)?;
            let method = match &entry.method {
                Some(toml::Value::String(method)) => parse_method(method)?,
                _ => return Err(Exception::MethodNotString),
            };
            let url = match &entry.url {
                Some(toml::Value::String(url)) => url,
                _ => return Err(Exception::UrlNotString),
            };
            self.register_callback(method, url, callback)?;
        }
        Ok(entries.len())
    }

    /// 获取方法对应的路由表，方法名大小写不敏感。
    pub fn table(&self, method: &str) -> Option<&RouteTable> {
        HttpRequestMethod::parse(method).map(|m| &self.tables[m.index()])
    }

    /// 按方法和键读取处理函数。
    ///
    /// 从不失败：方法或键不存在时返回兜底的 404 处理函数。
    pub fn handler(&self, method: &str, key: &str) -> Handler {
        self.table(method)
            .and_then(|table| table.get(key))
            .map(|route| route.handler().clone())
            .unwrap_or_else(|| self.not_found.clone())
    }

    /// 查找第一个匹配 `path` 的路由并提取参数。
    pub fn resolve(&self, method: &str, path: &str) -> Resolved<'_> {
        let table = match self.table(method) {
            Some(table) => table,
            None => return Resolved::NotFound,
        };
        table
            .iter()
            .find_map(|route| route.captures(path).map(|params| Resolved::Found { route, params }))
            .unwrap_or(Resolved::NotFound)
    }

    /// 将请求分发给匹配的处理函数。
    ///
    /// 这是接入 HTTP 服务器的入口，以关联函数的形式提供：
    /// `Router::dispatch(&router, &mut request, &mut response)`。
    /// 分发从不失败，响应总会被某个处理函数结束。
    pub fn dispatch(router: &Router, request: &mut Request, response: &mut Response) {
        let id = request.id();
        match router.resolve(request.method(), request.url()) {
            Resolved::Found { route, params } => {
                debug!(
                    "[ID{}]{} {} 命中路由{}，参数{:?}",
                    id,
                    request.method(),
                    request.url(),
                    route.pattern(),
                    params
                );
                request.set_params(params);
                route.handler().call(request, response);
            }
            Resolved::NotFound => {
                debug!("[ID{}]{} {} 没有匹配的路由", id, request.method(), request.url());
                request.set_params(Params::new());
                router.handler(request.method(), "").call(request, response);
            }
        }
    }
}

fn parse_method(method: &str) -> Result<HttpRequestMethod, Exception> {
    if method.is_empty() {
        return Err(Exception::MethodNotString);
    }
    HttpRequestMethod::parse(method).ok_or_else(|| Exception::UnsupportedMethod(method.to_string()))
}

fn check_callback(callback: &Callback) -> Result<(), Exception> {
    match callback.arity() {
        n if n < 2 => {
            error!("回调需要2个参数，实际为{}", n);
            Err(Exception::CallbackArity(n))
        }
        _ => Ok(()),
    }
}

fn not_callable(description: String) -> Exception {
    error!("回调不可调用：{}", description);
    Exception::CallbackNotCallable(description)
}
