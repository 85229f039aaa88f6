use serde_json::json;
use subdx::config::Config;
use subdx::metadata::extract_tags;
use subdx::pipeline::{find_subtitles, rank};
use subdx::query::guess_query;
use subdx::selection::{Action, Outcome, Screen, Selection, SelectionResult};
use subdx::subdivx::{Candidate, SubdivxClient};
use subdx::SubdxError;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILE: &str = "Show.S01E02.1080p.WEB.x265-FLUX.mkv";

fn candidate(id: u64, title: &str, description: &str, downloads: u64) -> Candidate {
    Candidate {
        description: description.to_string(),
        downloads,
        comment_count: 1,
        ..Candidate::new(id, title)
    }
}

fn ids(selection: &Selection) -> Vec<u64> {
    selection.page_rows().map(|(_, c)| c.id).collect()
}

#[test]
fn test_filename_to_ranked_selection() {
    let query = guess_query(FILE, false, None);
    let tags = extract_tags(FILE, None);

    let ranked = rank(
        &query,
        vec![
            candidate(10, "Show s01e02", "Subs para FLUX", 100),
            candidate(11, "Show s01e02", "", 500),
            candidate(12, "Show S01E02", "1080p WEB x265", 50),
            candidate(13, "Unrelated thing", "FLUX 1080p", 900),
        ],
        &tags,
    )
    .unwrap();

    assert_eq!(ranked.iter().map(|c| c.id).collect::<Vec<_>>(), vec![12, 10, 11]);
    assert_eq!(ranked[1].score, 0.75);
    assert_eq!(ranked[2].score, 0.5);

    let mut selection = Selection::new(ranked, tags, 2, 5);
    assert_eq!(ids(&selection), vec![12, 10]);

    selection.handle(Action::Right);
    assert_eq!(ids(&selection), vec![11]);
    assert_eq!(selection.handle(Action::Enter), Outcome::Done(SelectionResult::Selected(11)));
}

#[test]
fn test_unsuitable_results_stop_before_selection() {
    let query = guess_query(FILE, false, None);
    let err = rank(&query, vec![candidate(1, "Other Show s02e02", "", 1)], &Default::default()).unwrap_err();
    assert!(err.is_no_results());
}

#[test]
fn test_twenty_results_enter_after_page_change() {
    let list: Vec<Candidate> = (0..20).map(|i| candidate(1000 - i, "Show s01e02", "", 0)).collect();
    let mut selection = Selection::new(list, Default::default(), 10, 5);

    for action in [Action::Down, Action::Down, Action::Right] {
        assert_eq!(selection.handle(action), Outcome::Continue);
    }
    // page 1, row 0 is the eleventh result
    assert_eq!(selection.handle(Action::Enter), Outcome::Done(SelectionResult::Selected(990)));
}

#[tokio::test]
async fn test_search_browse_comments_and_download() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/inc/ajax.php"))
        .and(body_string_contains("tabla=resultados"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sEcho": "1",
            "iTotalRecords": 3,
            "aaData": [
                {"id": 7, "titulo": "Show s01e02", "descripcion": "FLUX", "descargas": 3, "comentarios": 1},
                {"id": 8, "titulo": "Show s01e02", "descripcion": "", "descargas": 90, "comentarios": 0},
                {"id": 9, "titulo": "Elsewhere", "descripcion": "", "descargas": 1000, "comentarios": 0}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/inc/ajax.php"))
        .and(body_string_contains("getComentarios=7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aaData": [{"comentario": "Sincroniza bien", "nick": "ana", "fecha_creacion": ""}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sub9/7"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04zip".to_vec()))
        .mount(&server)
        .await;

    let client = SubdivxClient::new(&Config::for_base_url(&server.uri())).unwrap();
    let query = guess_query(FILE, false, None);
    let tags = extract_tags(FILE, None);

    let ranked = find_subtitles(&client, &query, &tags).await.unwrap();
    // 7: flux 0.75; 8: most downloads among the filtered 0.5
    assert_eq!(ranked.iter().map(|c| c.id).collect::<Vec<_>>(), vec![7, 8]);

    let mut selection = Selection::new(ranked, tags, 10, 5);
    let Outcome::FetchComments(id) = selection.handle(Action::ShowComments) else {
        panic!("comments should be fetched");
    };
    selection.comments_loaded(client.comments(id).await);
    assert_eq!(selection.screen(), Screen::Comments);

    let Outcome::Done(SelectionResult::Selected(chosen)) = selection.handle(Action::Download) else {
        panic!("download should select");
    };

    let dir = tempfile::tempdir().unwrap();
    let saved = client.download(chosen, dir.path()).await.unwrap();
    assert_eq!(saved, dir.path().join("7.zip"));
}

#[tokio::test]
async fn test_search_without_records() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/inc/ajax.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sEcho": "1", "iTotalRecords": "0", "aaData": []
        })))
        .mount(&server)
        .await;

    let client = SubdivxClient::new(&Config::for_base_url(&server.uri())).unwrap();
    let query = guess_query("Nothing.At.All.2001.mkv", false, None);

    let err = find_subtitles(&client, &query, &Default::default()).await.unwrap_err();
    assert!(matches!(err, SubdxError::NoResults(_)));
}
