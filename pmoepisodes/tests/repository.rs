use std::time::Duration;

use mockito::Matcher;
use pmoepisodes::{
    EpisodeRepository, HttpEpisodeRepository, JsonFileEpisodeRepository, RepositoryError,
};

const EPISODES_JSON: &str = r#"[
    {
        "id": "como-virar-lider-desenvolvendo-software",
        "title": "Como virar líder desenvolvendo software",
        "members": "Diego e Richard",
        "published_at": "2021-01-22 16:29:00",
        "thumbnail": "https://example.org/lideranca.jpg",
        "description": "<p>Lead</p>",
        "file": {"url": "https://example.org/lideranca.m4a", "type": "audio/x-m4a", "duration": 3340}
    },
    {
        "id": "typescript-vale-a-pena",
        "title": "TypeScript vale a pena?",
        "members": "Diego, Richard e Thiago",
        "published_at": "2021-01-20 17:00:00",
        "thumbnail": "https://example.org/typescript.jpg",
        "description": "<p>TS</p>",
        "file": {"url": "https://example.org/typescript.m4a", "type": "audio/x-m4a", "duration": 2893}
    }
]"#;

#[test]
fn test_http_repository_lists_latest_episodes() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/episodes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("_limit".into(), "2".into()),
            Matcher::UrlEncoded("_sort".into(), "published_at".into()),
            Matcher::UrlEncoded("_order".into(), "desc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EPISODES_JSON)
        .create();

    let repository = HttpEpisodeRepository::new(format!("{}/episodes", server.url()))
        .with_limit(2)
        .with_timeout(Duration::from_secs(5));

    let episodes = repository.list_episodes().unwrap();
    mock.assert();
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].id, "como-virar-lider-desenvolvendo-software");
    assert_eq!(episodes[0].duration, 3340);
    assert_eq!(episodes[1].url, "https://example.org/typescript.m4a");
}

#[test]
fn test_http_repository_finds_single_episode() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/episodes/typescript-vale-a-pena")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id":"typescript-vale-a-pena","title":"TypeScript vale a pena?",
                "file":{"url":"https://example.org/typescript.m4a","duration":2893}}"#,
        )
        .create();

    let repository = HttpEpisodeRepository::new(format!("{}/episodes", server.url()))
        .with_timeout(Duration::from_secs(5));

    let episode = repository.find_episode("typescript-vale-a-pena").unwrap();
    mock.assert();
    assert_eq!(episode.map(|e| e.duration), Some(2893));
}

#[test]
fn test_http_repository_missing_episode_is_none() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/episodes/unknown")
        .with_status(404)
        .with_body("{}")
        .create();

    let repository = HttpEpisodeRepository::new(format!("{}/episodes", server.url()))
        .with_timeout(Duration::from_secs(5));

    assert_eq!(repository.find_episode("unknown").unwrap(), None);
    mock.assert();
}

#[test]
fn test_file_repository_reads_and_finds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episodes.json");
    std::fs::write(&path, EPISODES_JSON).unwrap();

    let repository = JsonFileEpisodeRepository::new(&path);
    let episodes = repository.list_episodes().unwrap();
    assert_eq!(episodes.len(), 2);

    let found = repository.find_episode("typescript-vale-a-pena").unwrap();
    assert_eq!(found.map(|e| e.duration), Some(2893));
    assert_eq!(repository.find_episode("nope").unwrap(), None);
}

#[test]
fn test_file_repository_reports_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episodes.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = JsonFileEpisodeRepository::new(&path)
        .list_episodes()
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Json(_)));
}

#[test]
fn test_file_repository_reports_missing_file() {
    let err = JsonFileEpisodeRepository::new("/nonexistent/episodes.json")
        .list_episodes()
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Io(_)));
}
