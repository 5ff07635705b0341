use std::sync::{Arc, Mutex};

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::Value;
use tera::Context;

use vista_core::domain::{Category, Comment, Post, User};
use vista_infra::migration::MigratorTrait;
use vista_infra::{
    Argon2PasswordService, DatabaseConfig, JwtConfig, JwtTokenService, Migrator, connect,
};
use web_server::config::default_template_dir;
use web_server::middleware::context::{FLASH_COOKIE, SESSION_COOKIE};
use web_server::render::{RenderError, TemplateEngine, TeraTemplates};
use web_server::{AppState, configure_routes};

/// Renders through the real templates and remembers every render.
struct RecordingTemplates {
    tera: TeraTemplates,
    renders: Mutex<Vec<(String, Value)>>,
}

impl RecordingTemplates {
    fn new() -> Self {
        Self {
            tera: TeraTemplates::load(&default_template_dir()).unwrap(),
            renders: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> (String, Value) {
        self.renders.lock().unwrap().last().cloned().unwrap()
    }

    fn count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }
}

impl TemplateEngine for RecordingTemplates {
    fn render(&self, name: &str, context: &Context) -> Result<String, RenderError> {
        self.renders
            .lock()
            .unwrap()
            .push((name.to_string(), context.clone().into_json()));
        self.tera.render(name, context)
    }
}

struct Blog {
    state: AppState,
    templates: Arc<RecordingTemplates>,
    author: User,
    reader: User,
    category: Category,
    post: Post,
}

impl Blog {
    async fn new() -> Self {
        let db = connect(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let templates = Arc::new(RecordingTemplates::new());
        let state = AppState::new(
            db,
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::default()),
            templates.clone(),
        );

        let hash = state.passwords.hash("password123").unwrap();
        let author = user(&state, "testuser", &hash).await;
        let reader = user(&state, "reader", &hash).await;
        let category = state
            .categories
            .insert(Category::new("Test Category", "test-category"))
            .await
            .unwrap();

        let post = publish(&state, &author, &category, "test title", "test-title", 60).await;

        Self {
            state,
            templates,
            author,
            reader,
            category,
            post,
        }
    }

    async fn publish(&self, title: &str, slug: &str, age_minutes: i64) -> Post {
        publish(&self.state, &self.author, &self.category, title, slug, age_minutes).await
    }

    async fn comment(&self, author: &User, content: &str, approved: bool) -> Comment {
        let comment = self
            .state
            .comments
            .insert(Comment::new(self.post.id, author.id, content.to_string()))
            .await
            .unwrap();
        if approved {
            self.state.comments.set_approved(comment.id, true).await.unwrap();
        }
        comment
    }

    fn session(&self, user: &User) -> Cookie<'static> {
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username)
            .unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    async fn call(&self, req: test::TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .configure(configure_routes),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    async fn stored_comment(&self, comment: &Comment) -> Option<Comment> {
        self.state.comments.find_by_id(comment.id).await.unwrap()
    }
}

/// Publish a post in `category`, created `age_minutes` ago.
async fn publish(
    state: &AppState,
    author: &User,
    category: &Category,
    title: &str,
    slug: &str,
    age_minutes: i64,
) -> Post {
    let mut post = Post::new(
        author.id,
        title.to_string(),
        slug.to_string(),
        "<p>Travel notes</p>".to_string(),
    )
    .in_category(category.id)
    .published();
    post.created_at = Utc::now() - Duration::minutes(age_minutes);
    state.posts.insert(post).await.unwrap()
}

async fn user(state: &AppState, username: &str, password_hash: &str) -> User {
    state
        .users
        .insert(User::new(username.to_string(), None, password_hash.to_string()))
        .await
        .unwrap()
}

fn location(resp: &ServiceResponse) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
}

fn response_cookie(resp: &ServiceResponse, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

fn message_values(context: &Value) -> Vec<String> {
    context["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["value"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_home_lists_published_post() {
    let blog = Blog::new().await;

    let resp = blog.call(test::TestRequest::get().uri("/")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "index.html");
    let items = context["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "test title");
    assert_eq!(items[0]["author"]["username"], "testuser");
    assert!(context["category"].is_null());
    assert_eq!(context["categories"][0]["name"], "Test Category");
}

#[actix_web::test]
async fn test_drafts_are_not_listed() {
    let blog = Blog::new().await;
    let draft = Post::new(
        blog.author.id,
        "draft".to_string(),
        "draft".to_string(),
        "wip".to_string(),
    );
    blog.state.posts.insert(draft).await.unwrap();

    blog.call(test::TestRequest::get().uri("/")).await;

    let (_, context) = blog.templates.last();
    assert_eq!(context["page_obj"]["total_items"], 1);
}

#[actix_web::test]
async fn test_category_listing_filters_posts() {
    let blog = Blog::new().await;
    let other = blog
        .state
        .categories
        .insert(Category::new("Mountains", "mountains"))
        .await
        .unwrap();
    let elsewhere = Post::new(
        blog.author.id,
        "alps".to_string(),
        "alps".to_string(),
        "snow".to_string(),
    )
    .in_category(other.id)
    .published();
    blog.state.posts.insert(elsewhere).await.unwrap();

    let resp = blog
        .call(test::TestRequest::get().uri("/category/test-category"))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "index.html");
    assert_eq!(context["category"]["slug"], "test-category");
    let items = context["page_obj"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "test-title");
}

#[actix_web::test]
async fn test_unknown_category_is_not_found() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::get().uri("/category/atlantis"))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(blog.templates.count(), 0);
}

#[actix_web::test]
async fn test_listing_paginates_four_per_page() {
    let blog = Blog::new().await;
    for i in 0..5 {
        blog.publish(&format!("post {i}"), &format!("post-{i}"), i).await;
    }

    blog.call(test::TestRequest::get().uri("/")).await;
    let (_, first) = blog.templates.last();
    assert_eq!(first["page_obj"]["items"].as_array().unwrap().len(), 4);
    assert_eq!(first["page_obj"]["num_pages"], 2);
    assert_eq!(first["page_obj"]["items"][0]["slug"], "post-0");
    assert_eq!(first["page_obj"]["has_next"], true);

    blog.call(test::TestRequest::get().uri("/?page=2")).await;
    let (_, second) = blog.templates.last();
    let slugs: Vec<_> = second["page_obj"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, ["post-4", "test-title"]);
    assert_eq!(second["page_obj"]["has_previous"], true);
}

#[actix_web::test]
async fn test_invalid_page_numbers_resolve() {
    let blog = Blog::new().await;
    for i in 0..5 {
        blog.publish(&format!("post {i}"), &format!("post-{i}"), i).await;
    }

    blog.call(test::TestRequest::get().uri("/?page=abc")).await;
    assert_eq!(blog.templates.last().1["page_obj"]["number"], 1);

    blog.call(test::TestRequest::get().uri("/?page=99")).await;
    assert_eq!(blog.templates.last().1["page_obj"]["number"], 2);

    blog.call(test::TestRequest::get().uri("/?page=0")).await;
    assert_eq!(blog.templates.last().1["page_obj"]["number"], 2);
}

#[actix_web::test]
async fn test_detail_counts_every_visit() {
    let blog = Blog::new().await;

    for _ in 0..2 {
        let resp = blog
            .call(test::TestRequest::get().uri("/post/test-title"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let (template, context) = blog.templates.last();
    assert_eq!(template, "post_detail.html");
    assert_eq!(context["post"]["views"], 2);
    assert_eq!(context["author"]["username"], "testuser");
    assert_eq!(context["category"]["name"], "Test Category");

    let stored = blog
        .state
        .posts
        .find_by_slug("test-title")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.views, 2);
}

#[actix_web::test]
async fn test_unknown_post_is_not_found() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::get().uri("/post/nowhere"))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_detail_shows_own_pending_comments_only() {
    let blog = Blog::new().await;
    blog.comment(&blog.reader, "still waiting", false).await;
    blog.comment(&blog.author, "visible", true).await;

    blog.call(
        test::TestRequest::get()
            .uri("/post/test-title")
            .cookie(blog.session(&blog.reader)),
    )
    .await;
    let (_, context) = blog.templates.last();
    assert_eq!(context["awaiting_comments"][0]["content"], "still waiting");
    assert_eq!(context["comments"].as_array().unwrap().len(), 1);
    assert_eq!(context["comments"][0]["mycomment"]["content"], "visible");

    blog.call(test::TestRequest::get().uri("/post/test-title"))
        .await;
    let (_, context) = blog.templates.last();
    assert!(context["awaiting_comments"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_new_comment_awaits_approval() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .cookie(blog.session(&blog.reader))
                .set_form([("content", "Lovely photos!")]),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/post/test-title");
    let flash = response_cookie(&resp, FLASH_COOKIE).unwrap();

    let pending = blog
        .state
        .comments
        .pending_for_author(blog.post.id, blog.reader.id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].item.approved);
    assert!(
        blog.state
            .comments
            .approved_for_post(blog.post.id)
            .await
            .unwrap()
            .is_empty()
    );

    let resp = blog
        .call(
            test::TestRequest::get()
                .uri("/post/test-title")
                .cookie(blog.session(&blog.reader))
                .cookie(flash),
        )
        .await;
    let (_, context) = blog.templates.last();
    assert_eq!(
        message_values(&context),
        ["Your comment has been submitted for approval."]
    );
    assert!(response_cookie(&resp, FLASH_COOKIE).is_some_and(|c| c.value().is_empty()));
}

#[actix_web::test]
async fn test_anonymous_comment_requires_login() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .set_form([("content", "hello")]),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/accounts/login?next=/post/test-title");
}

#[actix_web::test]
async fn test_blank_comment_rerenders_with_errors() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .cookie(blog.session(&blog.reader))
                .set_form([("content", "   ")]),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "post_detail.html");
    assert_eq!(
        context["comment_form"]["errors"]["content"][0],
        "This field is required."
    );
    assert!(context.get("awaiting_comments").is_none());
    assert_eq!(context["post"]["views"], 0);
}

#[actix_web::test]
async fn test_detail_page_edit_does_not_check_ownership() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.author, "original", true).await;
    let id = comment.id.to_string();

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .cookie(blog.session(&blog.reader))
                .set_form([
                    ("edit_comment", ""),
                    ("comment_id", id.as_str()),
                    ("content", "rewritten by someone else"),
                ]),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (_, context) = blog.templates.last();
    assert_eq!(message_values(&context), ["Comment updated successfully."]);
    assert_eq!(context["comment_form"]["content"], "rewritten by someone else");
    assert_eq!(
        context["comments"][0]["mycomment"]["content"],
        "rewritten by someone else"
    );

    let stored = blog.stored_comment(&comment).await.unwrap();
    assert_eq!(stored.content, "rewritten by someone else");
    assert!(stored.approved);
}

#[actix_web::test]
async fn test_detail_page_edit_with_invalid_content() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.author, "original", true).await;
    let id = comment.id.to_string();

    blog.call(
        test::TestRequest::post()
            .uri("/post/test-title")
            .set_form([("edit_comment", "1"), ("comment_id", id.as_str()), ("content", "")]),
    )
    .await;

    let (_, context) = blog.templates.last();
    assert_eq!(context["messages"][0]["level"], "error");
    assert_eq!(message_values(&context), ["Error updating comment."]);
    assert_eq!(blog.stored_comment(&comment).await.unwrap().content, "original");
}

#[actix_web::test]
async fn test_detail_page_delete_does_not_check_ownership() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.author, "doomed", true).await;
    let id = comment.id.to_string();

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .set_form([("delete_comment", ""), ("comment_id", id.as_str())]),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (_, context) = blog.templates.last();
    assert_eq!(message_values(&context), ["Comment deleted successfully."]);
    assert!(context["comments"].as_array().unwrap().is_empty());
    assert_eq!(context["comment_form"]["content"], "");
    assert!(blog.stored_comment(&comment).await.is_none());
}

#[actix_web::test]
async fn test_edit_marker_wins_over_delete_marker() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.author, "original", true).await;
    let id = comment.id.to_string();

    blog.call(
        test::TestRequest::post()
            .uri("/post/test-title")
            .cookie(blog.session(&blog.author))
            .set_form([
                ("delete_comment", ""),
                ("edit_comment", ""),
                ("comment_id", id.as_str()),
                ("content", "kept"),
            ]),
    )
    .await;

    assert_eq!(blog.stored_comment(&comment).await.unwrap().content, "kept");
}

#[actix_web::test]
async fn test_detail_page_mutation_needs_known_comment() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .set_form([("delete_comment", ""), ("comment_id", "not-a-uuid")]),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/post/test-title")
                .set_form([("edit_comment", ""), ("content", "x")]),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_owner_flag_compares_usernames_case_insensitively() {
    let blog = Blog::new().await;
    let upper = user(&blog.state, "Wanderer", &blog.reader.password_hash).await;
    let lower = user(&blog.state, "wanderer", &blog.reader.password_hash).await;
    blog.comment(&upper, "hi", true).await;

    blog.call(
        test::TestRequest::get()
            .uri("/post/test-title")
            .cookie(blog.session(&lower)),
    )
    .await;
    assert_eq!(blog.templates.last().1["comments"][0]["is_owner"], true);

    blog.call(
        test::TestRequest::get()
            .uri("/post/test-title")
            .cookie(blog.session(&blog.reader)),
    )
    .await;
    assert_eq!(blog.templates.last().1["comments"][0]["is_owner"], false);

    blog.call(test::TestRequest::get().uri("/post/test-title"))
        .await;
    assert_eq!(blog.templates.last().1["comments"][0]["is_owner"], false);
}

#[actix_web::test]
async fn test_post_user_flag() {
    let blog = Blog::new().await;

    blog.call(
        test::TestRequest::get()
            .uri("/post/test-title")
            .cookie(blog.session(&blog.author)),
    )
    .await;
    assert_eq!(blog.templates.last().1["is_post_user"], true);

    blog.call(
        test::TestRequest::get()
            .uri("/post/test-title")
            .cookie(blog.session(&blog.reader)),
    )
    .await;
    assert_eq!(blog.templates.last().1["is_post_user"], false);
}

#[actix_web::test]
async fn test_standalone_edit_by_owner() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.reader, "first draft", true).await;
    let uri = format!("/edit-comment/{}", comment.id);

    let resp = blog
        .call(
            test::TestRequest::get()
                .uri(&uri)
                .cookie(blog.session(&blog.reader)),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "edit_comment.html");
    assert_eq!(context["comment_form"]["content"], "first draft");
    assert_eq!(context["post"]["slug"], "test-title");

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri(&uri)
                .cookie(blog.session(&blog.reader))
                .set_form([("content", "second draft")]),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/post/test-title");
    assert!(response_cookie(&resp, FLASH_COOKIE).is_some());
    assert_eq!(
        blog.stored_comment(&comment).await.unwrap().content,
        "second draft"
    );
}

#[actix_web::test]
async fn test_standalone_edit_rejects_invalid_content() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.reader, "first draft", true).await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri(&format!("/edit-comment/{}", comment.id))
                .cookie(blog.session(&blog.reader))
                .set_form([("content", "")]),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "edit_comment.html");
    assert_eq!(
        context["comment_form"]["errors"]["content"][0],
        "This field is required."
    );
}

#[actix_web::test]
async fn test_standalone_views_hide_other_users_comments() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.author, "mine", true).await;
    let edit = format!("/edit-comment/{}", comment.id);
    let delete = format!("/delete-comment/{}", comment.id);

    for req in [
        test::TestRequest::get().uri(&edit).cookie(blog.session(&blog.reader)),
        test::TestRequest::get().uri(&edit),
        test::TestRequest::get().uri(&delete).cookie(blog.session(&blog.reader)),
        test::TestRequest::post()
            .uri(&edit)
            .cookie(blog.session(&blog.reader))
            .set_form([("content", "hijacked")]),
        test::TestRequest::post()
            .uri(&delete)
            .cookie(blog.session(&blog.reader)),
    ] {
        let resp = blog.call(req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    assert_eq!(blog.stored_comment(&comment).await.unwrap().content, "mine");
}

#[actix_web::test]
async fn test_standalone_delete_by_owner() {
    let blog = Blog::new().await;
    let comment = blog.comment(&blog.reader, "regrettable", false).await;
    let uri = format!("/delete-comment/{}", comment.id);

    let resp = blog
        .call(
            test::TestRequest::get()
                .uri(&uri)
                .cookie(blog.session(&blog.reader)),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "delete_comment.html");
    assert_eq!(context["comment"]["content"], "regrettable");

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri(&uri)
                .cookie(blog.session(&blog.reader)),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/post/test-title");
    assert!(blog.stored_comment(&comment).await.is_none());
}

#[actix_web::test]
async fn test_missing_comment_is_not_found() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::get()
                .uri(&format!("/edit-comment/{}", uuid::Uuid::new_v4()))
                .cookie(blog.session(&blog.reader)),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = blog
        .call(test::TestRequest::get().uri("/delete-comment/42"))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_like_toggles() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/like/test-title")
                .cookie(blog.session(&blog.reader)),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/post/test-title");
    assert!(
        blog.state
            .posts
            .is_liked_by(blog.post.id, blog.reader.id)
            .await
            .unwrap()
    );

    blog.call(
        test::TestRequest::get()
            .uri("/post/test-title")
            .cookie(blog.session(&blog.reader)),
    )
    .await;
    let (_, context) = blog.templates.last();
    assert_eq!(context["liked"], true);
    assert_eq!(context["like_count"], 1);

    blog.call(
        test::TestRequest::post()
            .uri("/like/test-title")
            .cookie(blog.session(&blog.reader)),
    )
    .await;
    assert!(
        !blog
            .state
            .posts
            .is_liked_by(blog.post.id, blog.reader.id)
            .await
            .unwrap()
    );
}

#[actix_web::test]
async fn test_like_requires_login() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::post().uri("/like/test-title"))
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/accounts/login?next=/post/test-title");
}

#[actix_web::test]
async fn test_invalid_session_is_anonymous() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::get()
                .uri("/")
                .cookie(Cookie::new(SESSION_COOKIE, "garbage")),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(blog.templates.last().1["viewer"]["is_authenticated"], false);
}

#[actix_web::test]
async fn test_bearer_token_is_accepted() {
    let blog = Blog::new().await;
    let token = blog
        .state
        .tokens
        .generate_token(blog.reader.id, &blog.reader.username)
        .unwrap();

    blog.call(
        test::TestRequest::get()
            .uri("/")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}"))),
    )
    .await;

    let (_, context) = blog.templates.last();
    assert_eq!(context["viewer"]["username"], "reader");
}

#[actix_web::test]
async fn test_signup_signs_in() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::post().uri("/accounts/signup").set_form([
            ("username", "nomad"),
            ("email", "nomad@example.com"),
            ("password", "longenough"),
            ("password_confirm", "longenough"),
        ]))
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let session = response_cookie(&resp, SESSION_COOKIE).unwrap();
    assert!(session.http_only().unwrap_or(false));

    let user = blog
        .state
        .users
        .find_by_username("nomad")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.email.as_deref(), Some("nomad@example.com"));

    blog.call(test::TestRequest::get().uri("/").cookie(session))
        .await;
    assert_eq!(blog.templates.last().1["viewer"]["username"], "nomad");
}

#[actix_web::test]
async fn test_signup_rejects_taken_username() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::post().uri("/accounts/signup").set_form([
            ("username", "reader"),
            ("email", ""),
            ("password", "longenough"),
            ("password_confirm", "longenough"),
        ]))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let (template, context) = blog.templates.last();
    assert_eq!(template, "signup.html");
    assert_eq!(
        context["form"]["errors"]["username"][0],
        "A user with that username already exists."
    );
    assert!(context["form"].get("password").is_none());
}

#[actix_web::test]
async fn test_login_redirects_to_next() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::post().uri("/accounts/login").set_form([
            ("username", "reader"),
            ("password", "password123"),
            ("next", "/post/test-title"),
        ]))
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/post/test-title");
    assert!(response_cookie(&resp, SESSION_COOKIE).is_some());
}

#[actix_web::test]
async fn test_login_ignores_offsite_next() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::post().uri("/accounts/login").set_form([
            ("username", "reader"),
            ("password", "password123"),
            ("next", "//evil.example"),
        ]))
        .await;

    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::post().uri("/accounts/login").set_form([
            ("username", "reader"),
            ("password", "wrong-password"),
        ]))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(response_cookie(&resp, SESSION_COOKIE).is_none());
    let (template, context) = blog.templates.last();
    assert_eq!(template, "login.html");
    assert_eq!(context["form"]["username"], "reader");
    assert!(!context["form"]["errors"]["non_field"][0].is_null());
}

#[actix_web::test]
async fn test_login_page_keeps_next() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::get().uri("/accounts/login?next=/post/test-title"))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(blog.templates.last().1["form"]["next"], "/post/test-title");
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let blog = Blog::new().await;

    let resp = blog
        .call(
            test::TestRequest::post()
                .uri("/accounts/logout")
                .cookie(blog.session(&blog.reader)),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let cleared = response_cookie(&resp, SESSION_COOKIE).unwrap();
    assert!(cleared.value().is_empty());
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let blog = Blog::new().await;

    let resp = blog
        .call(test::TestRequest::get().uri("/no/such/page"))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
