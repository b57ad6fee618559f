// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # URL 模式编译模块
//!
//! 将形如 `/users/:id` 的 URL 模式编译为正则表达式，并在匹配时提取命名参数。
//!
//! ## 支持的语法
//! - `:name`：命名参数，默认匹配到下一个分隔符（`/` 或 `.`）之前的内容。
//! - `:name(\d+)`：带自定义正则的命名参数。
//! - `(\d+)`：匿名分组，参数名为它在参数列表中的序号。
//! - 参数后的修饰符：`?` 可选，`*` 零次或多次，`+` 一次或多次。
//! - `\x`：转义字符，按字面量匹配。
//!
//! 编译结果区分大小写，允许一个结尾的 `/`，并锚定整个路径。
//! 参数名只能由 ASCII 字母、数字和下划线组成。

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::exception::Exception;

/// 一次匹配中提取出的路径参数：参数名 -> 参数值。
pub type Params = HashMap<String, String>;

lazy_static! {
    /// 模式词法分析用的正则：
    /// 1 转义字符，2 前缀分隔符，3 参数名，4 自定义正则，5 匿名分组，6 修饰符。
    static ref PATH_TOKEN: Regex = Regex::new(
        r"(\\.)|([/.])?(?::([A-Za-z0-9_]+)(?:\(((?:\\.|[^\\()])+)\))?|\(((?:\\.|[^\\()])+)\))([+*?])?"
    )
    .unwrap();

    /// 规范化后的 URL 必须以 `/` 开头且不含空白字符。
    static ref VALID_PATH: Regex = Regex::new(r"^/\S*$").unwrap();

    /// 带协议头的绝对 URL（如 `http://example.com`）不是路径。
    static ref HAS_SCHEME: Regex = Regex::new(r"^/?[A-Za-z][A-Za-z0-9+.\-]*://").unwrap();
}

/// 模式中声明的一个参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// 参数名；匿名分组使用其序号。
    pub name: String,
    /// 参数前的分隔符，`/`、`.` 或空串。
    pub prefix: String,
    /// 参数值所匹配的正则片段。
    pub pattern: String,
    pub optional: bool,
    pub repeat: bool,
    /// 参数后紧跟的不是分隔符（如 `/:a-:b` 中的 `:a`）。
    pub partial: bool,
}

/// 词法分析的产物：字面量片段或参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Key(Key),
}

/// 编译完成的 URL 模式。
#[derive(Debug, Clone)]
pub struct PathPattern {
    keys: Vec<Key>,
    matcher: Regex,
}

/// 规范化并校验注册时给出的 URL。
///
/// 缺少开头的 `/` 时自动补上；空串、纯空白、包含空白或带协议头的输入会被拒绝。
pub fn normalize(url: &str) -> Result<String, Exception> {
    if url.trim().is_empty() {
        return Err(Exception::InvalidUrl(url.to_string()));
    }
    let url = match url.starts_with('/') {
        true => url.to_string(),
        false => format!("/{}", url),
    };
    if !VALID_PATH.is_match(&url) || HAS_SCHEME.is_match(&url) {
        return Err(Exception::InvalidUrl(url));
    }
    Ok(url)
}

/// 将 URL 模式切分为字面量与参数。
pub fn parse(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut index = 0;
    let mut anonymous = 0;

    for caps in PATH_TOKEN.captures_iter(pattern) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        literal.push_str(&pattern[index..whole.start()]);
        index = whole.end();

        if let Some(escaped) = caps.get(1) {
            literal.push_str(&escaped.as_str()[1..]);
            continue;
        }

        let prefix = caps.get(2).map_or("", |m| m.as_str());
        let next = pattern[index..].chars().next();
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }

        let modifier = caps.get(6).map(|m| m.as_str());
        let delimiter = if prefix.is_empty() { "/" } else { prefix };
        let name = match caps.get(3) {
            Some(m) => m.as_str().to_string(),
            None => {
                anonymous += 1;
                (anonymous - 1).to_string()
            }
        };
        let value_pattern = match caps.get(4).or_else(|| caps.get(5)) {
            Some(custom) => custom.as_str().to_string(),
            None => format!("[^{}]+?", regex::escape(delimiter)),
        };

        tokens.push(Token::Key(Key {
            name,
            prefix: prefix.to_string(),
            pattern: value_pattern,
            optional: matches!(modifier, Some("?") | Some("*")),
            repeat: matches!(modifier, Some("+") | Some("*")),
            partial: !prefix.is_empty() && next.is_some_and(|c| !prefix.starts_with(c)),
        }));
    }

    literal.push_str(&pattern[index..]);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

/// 由词法单元生成正则表达式源码。
fn to_source(tokens: &[Token]) -> String {
    let mut route = String::new();
    for token in tokens {
        match token {
            Token::Literal(text) => route.push_str(&regex::escape(text)),
            Token::Key(key) => {
                let prefix = regex::escape(&key.prefix);
                let mut capture = format!("(?:{})", key.pattern);
                if key.repeat {
                    capture = format!("{}(?:{}{})*", capture, prefix, capture);
                }
                let capture = match (key.optional, key.partial) {
                    (true, false) => format!("(?:{}({}))?", prefix, capture),
                    (true, true) => format!("{}({})?", prefix, capture),
                    (false, _) => format!("{}({})", prefix, capture),
                };
                route.push_str(&capture);
            }
        }
    }
    // 非严格模式：结尾的 `/` 可有可无
    if route.ends_with('/') {
        route.pop();
    }
    format!("^{}(?:/)?$", route)
}

impl PathPattern {
    /// 编译一个已经规范化的 URL 模式。
    pub fn compile(pattern: &str) -> Result<Self, Exception> {
        let tokens = parse(pattern);
        let source = to_source(&tokens);
        let matcher =
            Regex::new(&source).map_err(|e| Exception::InvalidPattern(e.to_string()))?;
        let keys = tokens
            .into_iter()
            .filter_map(|token| match token {
                Token::Key(key) => Some(key),
                Token::Literal(_) => None,
            })
            .collect::<Vec<_>>();
        debug!("模式{}编译为{}，参数{}个", pattern, source, keys.len());
        Ok(Self { keys, matcher })
    }

    /// 正则表达式源码，作为路由表中的键。
    pub fn source(&self) -> &str {
        self.matcher.as_str()
    }

    /// 按声明顺序排列的参数。
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// 对路径进行匹配，并把第 i 个捕获组（从 1 开始）的值绑定到第 i 个参数名上。
    ///
    /// 没有参与匹配的可选参数不会出现在结果中。
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.matcher.captures(path)?;
        let params = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(i, key)| {
                caps.get(i + 1)
                    .map(|value| (key.name.clone(), value.as_str().to_string()))
            })
            .collect();
        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pattern: &PathPattern) -> Vec<&str> {
        pattern.keys().iter().map(|k| k.name.as_str()).collect()
    }

    #[test]
    fn test_normalize_prepends_slash() {
        assert_eq!(normalize("users").unwrap(), "/users");
        assert_eq!(normalize("/users").unwrap(), "/users");
        assert_eq!(normalize("/").unwrap(), "/");
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert!(matches!(normalize(""), Err(Exception::InvalidUrl(_))));
        assert!(matches!(normalize("   "), Err(Exception::InvalidUrl(_))));
        assert!(matches!(normalize("/a b"), Err(Exception::InvalidUrl(_))));
        assert!(matches!(
            normalize("http://example.com/users"),
            Err(Exception::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = PathPattern::compile("/users").unwrap();
        assert!(pattern.keys().is_empty());
        assert!(pattern.is_match("/users"));
        assert!(pattern.is_match("/users/"));
        assert!(!pattern.is_match("/USERS"));
        assert!(!pattern.is_match("/Users/"));
        assert!(!pattern.is_match("/users/42"));
        assert!(!pattern.is_match("/userss"));
        assert_eq!(pattern.captures("/users").unwrap(), Params::new());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::compile("/").unwrap();
        assert_eq!(pattern.source(), "^(?:/)?$");
        assert!(pattern.is_match("/"));
        assert!(!pattern.is_match("/a"));
    }

    #[test]
    fn test_named_parameter() {
        let pattern = PathPattern::compile("/users/:id").unwrap();
        assert_eq!(names(&pattern), vec!["id"]);
        let params = pattern.captures("/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(pattern.captures("/users").is_none());
        assert!(pattern.captures("/users/42/posts").is_none());
    }

    #[test]
    fn test_multiple_parameters() {
        let pattern = PathPattern::compile("/users/:user/posts/:post").unwrap();
        let params = pattern.captures("/users/ann/posts/7").unwrap();
        assert_eq!(params["user"], "ann");
        assert_eq!(params["post"], "7");
    }

    #[test]
    fn test_custom_parameter_pattern() {
        let pattern = PathPattern::compile(r"/items/:id(\d+)").unwrap();
        assert!(pattern.is_match("/items/12"));
        assert!(!pattern.is_match("/items/abc"));
    }

    #[test]
    fn test_optional_parameter() {
        let pattern = PathPattern::compile("/files/:name?").unwrap();
        assert_eq!(pattern.captures("/files").unwrap(), Params::new());
        assert_eq!(pattern.captures("/files/a.txt").unwrap()["name"], "a.txt");
    }

    #[test]
    fn test_repeated_parameters() {
        let zero_or_more = PathPattern::compile("/static/:path*").unwrap();
        assert!(zero_or_more.is_match("/static"));
        assert_eq!(zero_or_more.captures("/static/css/site.css").unwrap()["path"], "css/site.css");

        let one_or_more = PathPattern::compile("/docs/:path+").unwrap();
        assert!(!one_or_more.is_match("/docs"));
        assert_eq!(one_or_more.captures("/docs/a/b").unwrap()["path"], "a/b");
    }

    #[test]
    fn test_dot_prefixed_parameter() {
        let pattern = PathPattern::compile("/report.:format").unwrap();
        let params = pattern.captures("/report.json").unwrap();
        assert_eq!(params["format"], "json");
    }

    #[test]
    fn test_anonymous_group() {
        let pattern = PathPattern::compile(r"/v(\d+)/:name").unwrap();
        assert_eq!(names(&pattern), vec!["0", "name"]);
        let params = pattern.captures("/v2/ann").unwrap();
        assert_eq!(params["0"], "2");
        assert_eq!(params["name"], "ann");
    }

    #[test]
    fn test_partial_parameter() {
        let pattern = PathPattern::compile("/range/:from-:to").unwrap();
        let params = pattern.captures("/range/1-9").unwrap();
        assert_eq!(params["from"], "1");
        assert_eq!(params["to"], "9");
    }

    #[test]
    fn test_parameter_names_are_ascii() {
        let pattern = PathPattern::compile("/:名前").unwrap();
        assert!(pattern.keys().is_empty());
        assert!(pattern.is_match("/:名前"));
        assert!(!pattern.is_match("/ann"));

        let pattern = PathPattern::compile("/:user_id2").unwrap();
        assert_eq!(names(&pattern), vec!["user_id2"]);
        assert_eq!(pattern.captures("/é").unwrap()["user_id2"], "é");
    }

    #[test]
    fn test_escaped_colon_is_literal() {
        let pattern = PathPattern::compile(r"/time\:now").unwrap();
        assert!(pattern.keys().is_empty());
        assert!(pattern.is_match("/time:now"));
    }

    #[test]
    fn test_query_string_is_not_stripped() {
        let pattern = PathPattern::compile("/users/:id").unwrap();
        // 查询字符串被当作参数值的一部分
        assert_eq!(pattern.captures("/users/42?x=1").unwrap()["id"], "42?x=1");

        let literal = PathPattern::compile("/users").unwrap();
        assert!(!literal.is_match("/users?x=1"));
    }

    #[test]
    fn test_same_pattern_same_source() {
        let a = PathPattern::compile("/users/:id").unwrap();
        let b = PathPattern::compile("/users/:id").unwrap();
        assert_eq!(a.source(), b.source());
        let c = PathPattern::compile("/users/:uid").unwrap();
        assert_eq!(a.source(), c.source());
    }

    #[test]
    fn test_invalid_custom_pattern() {
        // 自定义正则中的 `[` 没有闭合
        let result = PathPattern::compile(r"/bad/:id([)");
        assert!(matches!(result, Err(Exception::InvalidPattern(_))));
    }
}
