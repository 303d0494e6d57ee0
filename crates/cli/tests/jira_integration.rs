use jira_search_api::{ApiError, ClientConfig, JiraClient, SearchFilters};
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_body() -> serde_json::Value {
    serde_json::json!({
        "startAt": 0,
        "maxResults": 50,
        "total": 1,
        "issues": [
            {
                "id": "10001",
                "key": "TEST-1",
                "fields": {
                    "summary": "First test issue",
                    "status": {"name": "Open"},
                    "priority": {"name": "High"},
                    "assignee": {"displayName": "John Doe"}
                }
            }
        ]
    })
}

async fn mount_session(server: &MockServer, status: u16, cookie: Option<&str>) {
    let mut response = ResponseTemplate::new(status);
    if let Some(cookie) = cookie {
        response = response.insert_header("set-cookie", cookie);
    }

    Mock::given(method("GET"))
        .and(path("/rest/auth/latest/session"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri()).unwrap()
}

#[tokio::test]
async fn test_login_sends_basic_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/auth/latest/session"))
        .and(basic_auth("jdoe", "secret"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "SESSION=abc; Path=/"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::login_basic_auth(config(&mock_server), "jdoe", "secret")
        .await
        .unwrap();

    assert!(client.is_authenticated());
    let cookies = client.credentials().unwrap().cookies();
    assert_eq!(cookies.get("SESSION").map(String::as_str), Some("abc"));
}

#[tokio::test]
async fn test_search_after_login_sends_session_cookie() {
    let mock_server = MockServer::start().await;
    mount_session(&mock_server, 200, Some("SESSION=abc; Path=/; HttpOnly")).await;

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .and(query_param("jql", "status=Open"))
        .and(header("cookie", "SESSION=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::login_basic_auth(config(&mock_server), "jdoe", "secret")
        .await
        .unwrap();
    let response = client.search(&SearchFilters::new()).await.unwrap();

    assert_eq!(response["total"], 1);
    assert_eq!(response["issues"][0]["key"], "TEST-1");
}

#[tokio::test]
async fn test_session_cookie_attributes_are_ignored() {
    let mock_server = MockServer::start().await;
    mount_session(
        &mock_server,
        200,
        Some("SESSION=abc; Path=/other; Domain=elsewhere.example; Secure"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .and(header("cookie", "SESSION=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::login_basic_auth(config(&mock_server), "jdoe", "secret")
        .await
        .unwrap();
    let response = client.search(&SearchFilters::new()).await.unwrap();

    assert_eq!(response["issues"][0]["key"], "TEST-1");
}

#[tokio::test]
async fn test_rejected_login_is_unauthenticated() {
    let mock_server = MockServer::start().await;
    mount_session(&mock_server, 401, Some("SESSION=nope; Path=/")).await;
    mount_search(&mock_server).await;

    let client = JiraClient::login_basic_auth(config(&mock_server), "jdoe", "wrong")
        .await
        .unwrap();
    assert!(!client.is_authenticated());

    let response = client.search(&SearchFilters::new()).await;
    assert!(response.is_ok());

    let requests = mock_server.received_requests().await.unwrap();
    let search = requests
        .iter()
        .find(|req| req.url.path() == "/rest/api/latest/search")
        .unwrap();
    assert!(search.headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_search_filters_reach_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param(
            "jql",
            "status=In Progress and reporter=jdoe and  priority=High",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(config(&mock_server).with_api_version("2")).unwrap();
    let filters = SearchFilters::new()
        .status("In Progress")
        .search_type("reporter")
        .user("jdoe")
        .priority("High");

    let response = client.search(&filters).await.unwrap();
    assert_eq!(response["issues"][0]["fields"]["priority"]["name"], "High");
}

#[tokio::test]
async fn test_assigned_and_reported_send_identical_requests() {
    let mock_server = MockServer::start().await;
    mount_session(&mock_server, 200, Some("SESSION=abc")).await;
    mount_search(&mock_server).await;

    let client = JiraClient::login_basic_auth(config(&mock_server), "jdoe", "secret")
        .await
        .unwrap();

    let assigned = client.assigned_to_me().await.unwrap();
    let reported = client.reported_by_me().await.unwrap();
    assert_eq!(assigned, reported);

    let requests = mock_server.received_requests().await.unwrap();
    let searches: Vec<_> = requests
        .iter()
        .filter(|req| req.url.path() == "/rest/api/latest/search")
        .collect();
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[0].url, searches[1].url);
    assert_eq!(searches[0].headers.get("cookie"), searches[1].headers.get("cookie"));

    let jql = searches[0]
        .url
        .query_pairs()
        .find(|(key, _)| key == "jql")
        .map(|(_, value)| value.into_owned());
    assert_eq!(jql.as_deref(), Some("status=Open and assignee=currentUser()"));
}

#[tokio::test]
async fn test_error_status_body_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "errorMessages": ["The value 'Nope' does not exist for the field 'status'."],
            "errors": {}
        })))
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(config(&mock_server)).unwrap();
    let response = client
        .search(&SearchFilters::new().status("Nope"))
        .await
        .unwrap();

    assert!(response["errorMessages"][0]
        .as_str()
        .unwrap()
        .contains("does not exist"));
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let client = JiraClient::new(config(&mock_server)).unwrap();
    let result = client.search(&SearchFilters::new()).await;

    assert!(matches!(result, Err(ApiError::JsonError(_))));
}

#[tokio::test]
async fn test_login_transport_failure_propagates() {
    let mock_server = MockServer::start().await;
    let config = config(&mock_server);
    drop(mock_server);

    let result = JiraClient::login_basic_auth(config, "jdoe", "secret").await;
    assert!(matches!(result, Err(ApiError::RequestFailed(_))));
}
