//! The booking platform's route table.

use axum::http::Method;

use crate::auth::AuthRequirement;
use crate::config::schema::ServiceName;
use crate::routing::matcher::{MethodFilter, PathPattern};
use crate::routing::rule::{Handler, PathRewrite, ProxyTarget, RouteRule};
use crate::rpc::RpcOperation;

/// Priority of rules carved out of a broader prefix.
pub const SPECIFIC: u32 = 10;

fn exact(name: &str, methods: MethodFilter, path: &str) -> RouteRule {
    RouteRule::new(name, methods, PathPattern::exact(path)).priority(SPECIFIC)
}

fn prefix(name: &str, path: &str) -> RouteRule {
    RouteRule::new(name, MethodFilter::Any, PathPattern::prefix(path))
}

fn get() -> MethodFilter {
    MethodFilter::only([Method::GET])
}

fn post() -> MethodFilter {
    MethodFilter::only([Method::POST])
}

pub fn booking_routes() -> Vec<RouteRule> {
    use AuthRequirement::{Authenticated, Optional};
    use ServiceName::*;

    vec![
        exact("ping", get(), "/ping").handler(Handler::Health),
        // auth
        exact("auth-login", post(), "/api/auth/login").proxy(Auth, "/api/auth", ""),
        exact("auth-register", post(), "/api/auth/register").proxy(Auth, "/api/auth", ""),
        prefix("auth", "/api/auth").auth(Authenticated).proxy(Auth, "/api/auth", ""),
        // stakeholder
        exact("stakeholder-profile-get", get(), "/api/stakeholder/profile")
            .auth(Authenticated)
            .rpc(RpcOperation::GetProfile),
        exact("stakeholder-profile-put", MethodFilter::only([Method::PUT]), "/api/stakeholder/profile")
            .auth(Authenticated)
            .proxy(Stakeholder, "/api/stakeholder/profile", "/profile"),
        exact(
            "stakeholder-position",
            MethodFilter::only([Method::GET, Method::POST, Method::DELETE]),
            "/api/stakeholder/position",
        )
        .auth(Authenticated)
        .proxy(Stakeholder, "/api/stakeholder/position", "/position"),
        prefix("stakeholder", "/api/stakeholder")
            .auth(AuthRequirement::None)
            .proxy(Stakeholder, "/api/stakeholder", ""),
        // tours
        prefix("tours", "/api/tours").auth(Authenticated).proxy(Tour, "/api/tours", ""),
        prefix("tour", "/api/tour").auth(Authenticated).proxy(Tour, "/api/tour", ""),
        // blogs
        exact("blogs-list", get(), "/api/blogs")
            .auth(Optional)
            .handler(Handler::PersonalizedOrProxy {
                operation: RpcOperation::GetPersonalizedBlogs,
                fallback: ProxyTarget::new(Blog, PathRewrite::new("/api/blogs", "")),
            }),
        exact("blogs-create", post(), "/api/blogs")
            .auth(Authenticated)
            .rpc(RpcOperation::CreateBlog),
        RouteRule::new("blogs-comments", get(), PathPattern::prefix("/api/blogs/comments"))
            .priority(SPECIFIC)
            .proxy(Blog, "/api/blogs", ""),
        prefix("blogs", "/api/blogs").auth(Authenticated).proxy(Blog, "/api/blogs", ""),
        // reviews
        prefix("reviews", "/api/reviews").auth(Authenticated).proxy(Review, "/api/reviews", ""),
        // purchases
        exact("purchases-checkout", post(), "/api/purchases/cart/checkout")
            .auth(Authenticated)
            .rpc(RpcOperation::Checkout),
        exact("purchases-tokens", get(), "/api/purchases/tokens")
            .auth(Authenticated)
            .rpc(RpcOperation::GetPurchasedTours),
        prefix("purchases", "/api/purchases")
            .auth(Authenticated)
            .proxy(Purchase, "/api/purchases", ""),
        // followers
        prefix("followers", "/api/followers")
            .auth(Authenticated)
            .proxy(Follower, "/api/followers", ""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteTable;

    fn table() -> RouteTable {
        RouteTable::new(booking_routes())
    }

    fn resolve(method: Method, path: &str) -> RouteRule {
        table()
            .resolve(&method, path)
            .unwrap_or_else(|| panic!("no route for {} {}", method, path))
            .clone()
    }

    #[test]
    fn table_has_no_unreachable_rules() {
        assert_eq!(table().conflicts(), vec![]);
    }

    #[test]
    fn login_and_register_are_public() {
        for path in ["/api/auth/login", "/api/auth/register"] {
            let rule = resolve(Method::POST, path);
            assert_eq!(rule.auth, AuthRequirement::None, "{}", path);
        }
        assert_eq!(resolve(Method::GET, "/api/auth/login").auth, AuthRequirement::Authenticated);
        assert_eq!(resolve(Method::GET, "/api/auth/me").name, "auth");
    }

    #[test]
    fn rpc_routes_beat_their_prefixes() {
        assert_eq!(
            resolve(Method::POST, "/api/purchases/cart/checkout").handler,
            Handler::Rpc(RpcOperation::Checkout)
        );
        assert_eq!(
            resolve(Method::GET, "/api/purchases/tokens").handler,
            Handler::Rpc(RpcOperation::GetPurchasedTours)
        );
        assert_eq!(resolve(Method::GET, "/api/purchases/cart").name, "purchases");
        assert_eq!(
            resolve(Method::GET, "/api/stakeholder/profile").handler,
            Handler::Rpc(RpcOperation::GetProfile)
        );
        assert_eq!(
            resolve(Method::POST, "/api/blogs").handler,
            Handler::Rpc(RpcOperation::CreateBlog)
        );
    }

    #[test]
    fn stakeholder_split() {
        assert_eq!(resolve(Method::PUT, "/api/stakeholder/profile").name, "stakeholder-profile-put");
        assert_eq!(resolve(Method::DELETE, "/api/stakeholder/position").name, "stakeholder-position");
        let public = resolve(Method::PATCH, "/api/stakeholder/position");
        assert_eq!(public.name, "stakeholder");
        assert_eq!(public.auth, AuthRequirement::None);
        assert_eq!(resolve(Method::POST, "/api/stakeholder").auth, AuthRequirement::None);
    }

    #[test]
    fn blogs_split() {
        assert_eq!(resolve(Method::GET, "/api/blogs").auth, AuthRequirement::Optional);
        let comments = resolve(Method::GET, "/api/blogs/comments/3");
        assert_eq!(comments.name, "blogs-comments");
        assert_eq!(comments.auth, AuthRequirement::None);
        assert_eq!(resolve(Method::POST, "/api/blogs/comments").name, "blogs");
        assert_eq!(resolve(Method::DELETE, "/api/blogs/9").auth, AuthRequirement::Authenticated);
    }

    #[test]
    fn tour_prefixes_are_distinct() {
        assert_eq!(resolve(Method::GET, "/api/tours/42").name, "tours");
        assert_eq!(resolve(Method::GET, "/api/tour/execution").name, "tour");
        assert!(table().resolve(&Method::GET, "/api/tourist").is_none());
    }

    #[test]
    fn tours_rewrite() {
        match resolve(Method::GET, "/api/tours/42").handler {
            Handler::Proxy(target) => {
                assert_eq!(target.service, ServiceName::Tour);
                assert_eq!(target.rewrite.apply("/api/tours/42"), "/42");
            }
            other => panic!("unexpected handler {:?}", other),
        }
    }

    #[test]
    fn unknown_paths_have_no_route() {
        assert!(table().resolve(&Method::GET, "/").is_none());
        assert!(table().resolve(&Method::POST, "/ping").is_none());
    }
}
