use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use contacts_quotes::auth::{hash_password, JwtService};
use contacts_quotes::config::Config;
use contacts_quotes::db::{init_db, Schema};
use contacts_quotes::domain::{Author, NewAuthor, NewQuote, NewUser, Tag};
use contacts_quotes::web::{self, SiteState};
use contacts_quotes::Repository;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestSite {
    app: axum::Router,
    repo: Arc<Repository>,
    jwt: Arc<JwtService>,
    _temp: TempDir,
}

async fn setup_test_site() -> TestSite {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("quotes.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path, Schema::Quotes)
        .await
        .expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        secret_key: "test-secret".to_string(),
        access_token_ttl_minutes: 60,
        rate_limit_enabled: false,
    };
    let state = SiteState::new(repo.clone(), &config);
    let jwt = state.jwt.clone();

    TestSite {
        app: web::create_router(state),
        repo,
        jwt,
        _temp: temp_dir,
    }
}

struct Page {
    status: StatusCode,
    location: Option<String>,
    set_cookie: Option<String>,
    body: String,
}

impl TestSite {
    async fn author(&self, name: &str) -> Author {
        self.repo
            .create_author(&NewAuthor {
                fullname: name.to_string(),
                born_date: "March 14, 1879".to_string(),
                born_location: "in Ulm, Germany".to_string(),
                description: "Physicist".to_string(),
            })
            .await
            .unwrap()
    }

    async fn tag(&self, name: &str) -> Tag {
        self.repo.get_or_create_tag(name).await.unwrap()
    }

    async fn quote(&self, text: &str, author: &Author, tags: &[&Tag]) {
        self.repo
            .create_quote(&NewQuote {
                quote: text.to_string(),
                author_id: author.id,
                tag_ids: tags.iter().map(|t| t.id).collect(),
            })
            .await
            .unwrap();
    }

    async fn session(&self, username: &str) -> String {
        let user = self
            .repo
            .create_user(&NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        format!("sessionid={}", self.jwt.create_token(user.id).unwrap())
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Page {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, form: &str, cookie: Option<&str>) -> Page {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> Page {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .map(|v: &header::HeaderValue| v.to_str().unwrap().to_string())
        };
        let location = header_value(header::LOCATION);
        let set_cookie = header_value(header::SET_COOKIE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Page {
            status,
            location,
            set_cookie,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

#[tokio::test]
async fn test_home_paginates_strictly() {
    let site = setup_test_site().await;
    let author = site.author("Albert Einstein").await;
    for i in 1..=11 {
        site.quote(&format!("Quote number {}", i), &author, &[]).await;
    }

    let page = site.get("/", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Quote number 1<"));
    assert!(page.body.contains("Quote number 10<"));
    assert!(!page.body.contains("Quote number 11<"));
    assert!(page.body.contains("href=\"/2\""));

    let page = site.get("/2", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Quote number 11<"));
    assert!(page.body.contains("href=\"/1\""));

    assert_eq!(site.get("/3", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(site.get("/0", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(site.get("/abc", None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_home_is_valid() {
    let site = setup_test_site().await;
    let page = site.get("/", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Top Ten tags"));
}

#[tokio::test]
async fn test_home_ranks_top_tags() {
    let site = setup_test_site().await;
    let author = site.author("Albert Einstein").await;
    let a = site.tag("alpha").await;
    let b = site.tag("beta").await;
    let c = site.tag("gamma").await;

    site.quote("one", &author, &[&a, &b, &c]).await;
    site.quote("two", &author, &[&a, &c]).await;
    site.quote("three", &author, &[&a]).await;

    let body = site.get("/", None).await.body;
    let tags_box = &body[body.find("Top Ten tags").unwrap()..];
    let pos = |name: &str| tags_box.find(&format!(">{}<", name)).unwrap();
    assert!(pos("alpha") < pos("gamma"));
    assert!(pos("gamma") < pos("beta"));
}

#[tokio::test]
async fn test_author_page() {
    let site = setup_test_site().await;
    let author = site.author("Albert Einstein").await;

    let page = site.get(&format!("/author/{}", author.id), None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Albert Einstein"));
    assert!(page.body.contains("in Ulm, Germany"));

    assert_eq!(site.get("/author/999", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(site.get("/author/abc", None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_find_tag_by_id_or_name() {
    let site = setup_test_site().await;
    let author = site.author("Albert Einstein").await;
    let life = site.tag("life").await;
    let other = site.tag("other").await;
    site.quote("Life is like riding a bicycle", &author, &[&life]).await;
    site.quote("Unrelated words", &author, &[&other]).await;

    for uri in ["/tag/life".to_string(), format!("/tag/{}", life.id)] {
        let page = site.get(&uri, None).await;
        assert_eq!(page.status, StatusCode::OK, "{}", uri);
        assert!(page.body.contains("Viewing tag"));
        assert!(page.body.contains("Life is like riding a bicycle"));
        assert!(!page.body.contains("Unrelated words"));
    }

    let page = site.get("/tag/life?page=99", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Life is like riding a bicycle"));

    let page = site.get("/tag/life?page=abc", None).await;
    assert_eq!(page.status, StatusCode::OK);

    let page = site.get("/tag/unknown", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("unknown"));
    assert!(!page.body.contains("class=\"quote\""));
}

#[tokio::test]
async fn test_add_forms_require_login() {
    let site = setup_test_site().await;

    for uri in ["/quotes/add", "/authors/add", "/tags/add"] {
        let page = site.get(uri, None).await;
        assert_eq!(page.status, StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(page.location.as_deref(), Some("/users/login"));
    }

    let page = site.post("/tags/add", "name=love", None).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/users/login"));

    let page = site.get("/tags/add", Some("sessionid=not-a-token")).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_add_tag_and_reject_duplicate() {
    let site = setup_test_site().await;
    let cookie = site.session("editor").await;

    let page = site.get("/tags/add", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("editor"));

    let page = site.post("/tags/add", "name=love", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));

    let page = site.post("/tags/add", "name=love", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Incorrect form"));
    assert!(page.body.contains("already exists"));

    let page = site
        .post("/tags/add", &format!("name={}", "x".repeat(26)), Some(&cookie))
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("at most 25 characters"));
}

#[tokio::test]
async fn test_add_author_then_quote() {
    let site = setup_test_site().await;
    let cookie = site.session("editor").await;

    let page = site
        .post(
            "/authors/add",
            "fullname=Jane+Austen&born_date=December+16%2C+1775&born_location=in+Steventon&description=Novelist",
            Some(&cookie),
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    let author = site
        .repo
        .find_author_by_fullname("Jane Austen")
        .await
        .unwrap()
        .unwrap();
    let a = site.tag("books").await;
    let b = site.tag("wit").await;

    let page = site.get("/quotes/add", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Jane Austen"));

    let form = format!(
        "quote=It+is+a+truth&author={}&tags={}&tags={}",
        author.id, a.id, b.id
    );
    let page = site.post("/quotes/add", &form, Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    let quotes = site.repo.list_quotes(10, 0).await.unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].author_name, "Jane Austen");
    assert_eq!(quotes[0].tags.len(), 2);

    let page = site
        .post("/quotes/add", "quote=Orphan&author=999", Some(&cookie))
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Incorrect form"));

    let page = site
        .post("/authors/add", "fullname=&born_date=x", Some(&cookie))
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("This field is required."));
}

#[tokio::test]
async fn test_add_quote_with_non_numeric_tag_rerenders_form() {
    let site = setup_test_site().await;
    let cookie = site.session("editor").await;
    let author = site.author("Albert Einstein").await;

    let form = format!("quote=Hi&author={}&tags=abc", author.id);
    let page = site.post("/quotes/add", &form, Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Incorrect form"));
    assert!(page.body.contains("Select a valid choice."));
    assert!(site.repo.list_quotes(10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tag_links_use_ids() {
    let site = setup_test_site().await;
    let author = site.author("Albert Einstein").await;
    let odd = site.tag("why?/not#").await;
    site.quote("Question everything", &author, &[&odd]).await;

    let home = site.get("/", None).await;
    let href = format!("href=\"/tag/{}\"", odd.id);
    assert!(home.body.contains(&href));

    let page = site.get(&format!("/tag/{}", odd.id), None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Question everything"));
    assert!(page.body.contains(&href));
}

#[tokio::test]
async fn test_signup_login_logout_flow() {
    let site = setup_test_site().await;

    let page = site
        .post(
            "/users/signup",
            "username=alice&email=alice%40example.com&password1=secret1&password2=secret2",
            None,
        )
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("didn&#39;t match") || page.body.contains("didn&#x27;t match"));

    let page = site
        .post(
            "/users/signup",
            "username=alice&email=alice%40example.com&password1=secret1&password2=secret1",
            None,
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/users/login"));

    let page = site
        .post(
            "/users/signup",
            "username=alice&email=other%40example.com&password1=secret1&password2=secret1",
            None,
        )
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("already exists"));

    let page = site
        .post("/users/login", "username=alice&password=wrong12", None)
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.set_cookie.is_none());

    let page = site
        .post("/users/login", "username=alice&password=secret1", None)
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));
    let set_cookie = page.set_cookie.unwrap();
    assert!(set_cookie.starts_with("sessionid="));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let page = site.get("/", Some(&cookie)).await;
    assert!(page.body.contains("alice"));
    assert!(page.body.contains("/users/logout"));

    let page = site.get("/users/logout", Some(&cookie)).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let cleared = page.set_cookie.unwrap();
    assert!(cleared.starts_with("sessionid="));
}

#[tokio::test]
async fn test_login_with_stored_hash() {
    let site = setup_test_site().await;
    site.repo
        .create_user(&NewUser {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password_hash: hash_password("hunter22").unwrap(),
        })
        .await
        .unwrap();

    let page = site
        .post("/users/login", "username=bob&password=hunter22", None)
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    let page = site.post("/users/login", "username=bob&password=x", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Incorrect form"));
}
