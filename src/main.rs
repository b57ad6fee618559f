// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 示例服务器
//!
//! 演示如何把 `Router` 接入基于 Tokio 的 TCP 服务器：
//! - 从 `config/development.toml` 读取端口、线程数、404 正文以及配置文件中声明的路由
//! - 通过 log4rs 输出日志，配置位于 `config/log4rs.yaml`
//! - 每个连接读取一个请求，交给 `Router::dispatch` 处理，再把响应写回 Socket

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
    time::Instant,
};

use log::{debug, error, info};
use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use rauter::{Config, Exception, HandlerRegistry, Request, Response, Router};

fn main() {
    // 1. 初始化日志系统
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        eprintln!("无法初始化日志系统：{}", e);
    }

    // 2. 加载配置
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");

    // 3. 构建路由器，注册完成后只读共享
    let router = match build_router(&config) {
        Ok(router) => Arc::new(router),
        Err(e) => {
            error!("路由注册失败：{}", e);
            return;
        }
    };

    // 4. 按配置的线程数创建运行时
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建Tokio运行时：{}", e);
            return;
        }
    };

    runtime.block_on(serve(config, router));
}

fn index(_request: &mut Request, response: &mut Response) {
    response.set_content_type("text/plain;charset=utf-8");
    response.end("hello from rauter");
}

fn show_user(request: &mut Request, response: &mut Response) {
    let body = json!({ "id": request.param("id") });
    response.set_content_type("application/json");
    response.end(body.to_string());
}

fn echo_params(request: &mut Request, response: &mut Response) {
    match serde_json::to_string(request.params()) {
        Ok(body) => {
            response.set_content_type("application/json");
            response.end(body);
        }
        Err(e) => {
            error!("[ID{}]无法序列化路径参数：{}", request.id(), e);
            response.set_status_code(500);
            response.end("Internal Server Error");
        }
    }
}

/// 注册内置路由，然后加载配置文件中声明的路由。
fn build_router(config: &Config) -> Result<Router, Exception> {
    let mut router = Router::with_not_found_message(config.not_found_message());
    router.get("/", index)?;
    router.get("/users/:id", show_user)?;
    router.get("/echo/:path*", echo_params)?;
    router.delete("/users/:id", echo_params)?;

    let mut registry = HandlerRegistry::new();
    registry
        .insert("index", index)
        .insert("show_user", show_user)
        .insert("echo_params", echo_params);
    let loaded = router.load_routes(config.routes(), &registry)?;
    info!("从配置文件加载了{}条路由", loaded);
    Ok(router)
}

async fn serve(config: Config, router: Arc<Router>) {
    let port = config.port();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    let socket = SocketAddrV4::new(address, port);
    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("服务端在{}上监听Socket连接", socket);

    let mut id: u128 = 0;
    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("接受连接失败：{}", e);
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("收到停机信号，正在退出...");
                break;
            }
        };
        debug!("[ID{}]新的连接：{}", id, addr);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            handle_connection(stream, id, router).await;
        });
        id += 1;
    }
}

/// 读取一个请求，分发后写回响应。
async fn handle_connection(mut stream: TcpStream, id: u128, router: Arc<Router>) {
    let mut buffer = vec![0; 1024];
    let n = match stream.read(&mut buffer).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
    };
    let start_time = Instant::now();

    let mut response = Response::new();
    match Request::try_from(&buffer[..n], id) {
        Ok(mut request) => {
            Router::dispatch(&router, &mut request, &mut response);
            info!(
                "[ID{}] {}, {}, {}, {}, {}",
                id,
                request.version(),
                request.method(),
                request.url(),
                response.status_code(),
                request.user_agent(),
            );
        }
        Err(e) => {
            error!("[ID{}]解析HTTP请求失败: {}", id, e);
            response.set_status_code(400);
            response.end("Bad Request");
        }
    }
    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    if let Err(e) = stream.write_all(&response.as_bytes()).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}
