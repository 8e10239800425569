//! End-to-end tests for the publications pipeline against a mock
//! E-utilities server and the in-memory store.

use mockito::Matcher;

use physician_profiler::config::PubMedSettings;
use physician_profiler::models::RosterEntry;
use physician_profiler::pipeline::{publications, EntryError, FailureReporter};
use physician_profiler::sources::PubMedClient;
use physician_profiler::store::MemoryStore;

fn entry(record_id: &str, full_name: &str) -> RosterEntry {
    RosterEntry {
        record_id: record_id.to_string(),
        full_name: full_name.to_string(),
    }
}

fn test_settings() -> PubMedSettings {
    PubMedSettings {
        batch_delay_ms: 0,
        ..Default::default()
    }
}

const EFETCH_BODY: &str = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">100</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><Year>2020</Year></PubDate></JournalIssue>
          <Title>Journal of Dermatology</Title>
        </Journal>
        <ArticleTitle>First article</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <AffiliationInfo><Affiliation>Acme Medical College</Affiliation></AffiliationInfo>
          </Author>
          <Author>
            <LastName>Smith</LastName>
            <ForeName>Bob</ForeName>
            <AffiliationInfo><Affiliation>Beta Lab</Affiliation></AffiliationInfo>
          </Author>
        </AuthorList>
        <PublicationTypeList>
          <PublicationType UI="D016428">Journal Article</PublicationType>
        </PublicationTypeList>
      </Article>
      <MedlineJournalInfo><Country>India</Country></MedlineJournalInfo>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">200</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><Year>2021</Year><Month>06</Month></PubDate></JournalIssue>
          <Title>Journal of Dermatology</Title>
        </Journal>
        <ArticleTitle>Second article</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
          </Author>
        </AuthorList>
        <PublicationTypeList>
          <PublicationType UI="D016428">Journal Article</PublicationType>
        </PublicationTypeList>
      </Article>
      <MedlineJournalInfo><Country>India</Country></MedlineJournalInfo>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

const ELINK_BODY: &str = r#"
<eLinkResult>
  <LinkSet>
    <DbFrom>pubmed</DbFrom>
    <IdList><Id>100</Id></IdList>
    <LinkSetDb>
      <DbTo>pubmed</DbTo>
      <LinkName>pubmed_pubmed_citedin</LinkName>
      <Link><Id>900</Id></Link>
      <Link><Id>901</Id></Link>
      <Link><Id>902</Id></Link>
      <Link><Id>903</Id></Link>
      <Link><Id>904</Id></Link>
    </LinkSetDb>
  </LinkSet>
  <LinkSet>
    <IdList><Id>200</Id></IdList>
  </LinkSet>
</eLinkResult>"#;

async fn mock_full_pipeline(server: &mut mockito::Server) {
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::UrlEncoded(
            "term".into(),
            "Jane Doe[Author]".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"esearchresult": {"idlist": ["100", "200"]}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "100,200".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(EFETCH_BODY)
        .create_async()
        .await;
    server
        .mock("GET", "/elink.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "100,200".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(ELINK_BODY)
        .create_async()
        .await;
}

#[tokio::test]
async fn builds_profile_with_citation_statistics() {
    let mut server = mockito::Server::new_async().await;
    mock_full_pipeline(&mut server).await;

    let settings = test_settings();
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();

    let article_count =
        publications::process_entry(&client, &store, &settings, &entry("42", "Jane Doe"))
            .await
            .unwrap();
    assert_eq!(article_count, 2);

    let profile = store.profile("42").unwrap();
    assert_eq!(profile.full_name, "Jane Doe");
    assert_eq!(profile.total_articles, 2);
    assert_eq!(profile.total_citations, 5);
    assert_eq!(profile.average_citations_per_article, 2.5);
    assert_eq!(profile.top_cited_articles[0].pmid, "100");
    assert_eq!(profile.top_cited_articles[0].citations, 5);
    assert_eq!(profile.top_cited_articles[1].citations, 0);

    // year window 2020-2021, one article each
    assert_eq!(profile.earliest_publication_year, Some(2020));
    assert_eq!(profile.latest_publication_year, Some(2021));
    assert_eq!(profile.average_publications_per_year, 1.0);
    assert_eq!(profile.yearwise_article_counts.get("2020"), Some(&1));

    // month/day default to 01
    assert_eq!(profile.articles[0].publication_date, "2020-01-01");
    assert_eq!(profile.articles[1].publication_date, "2021-06-01");

    // subject vs co-author partition
    assert_eq!(profile.unique_coauthor_count, 1);
    assert_eq!(profile.average_coauthors_per_article, 0.5);
    assert_eq!(profile.top_coauthors[0].name, "Bob Smith");
    assert_eq!(profile.top_coauthors[0].affiliations, vec!["Beta Lab"]);
    assert_eq!(profile.affiliations, vec!["Acme Medical College"]);

    assert_eq!(profile.journals.get("Journal of Dermatology"), Some(&2));
    assert_eq!(profile.unique_journal_count, 1);
    assert_eq!(profile.publication_types.get("Journal Article"), Some(&2));
}

const SINGLE_EFETCH_BODY: &str = r#"
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">100</PMID>
      <Article>
        <Journal>
          <JournalIssue><PubDate><Year>2020</Year></PubDate></JournalIssue>
          <Title>Journal of Dermatology</Title>
        </Journal>
        <ArticleTitle>First article</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

const SINGLE_ELINK_BODY: &str = r#"
<eLinkResult>
  <LinkSet>
    <DbFrom>pubmed</DbFrom>
    <IdList><Id>100</Id></IdList>
    <LinkSetDb>
      <DbTo>pubmed</DbTo>
      <LinkName>pubmed_pubmed_citedin</LinkName>
      <Link><Id>900</Id></Link>
      <Link><Id>901</Id></Link>
      <Link><Id>902</Id></Link>
      <Link><Id>903</Id></Link>
      <Link><Id>904</Id></Link>
    </LinkSetDb>
  </LinkSet>
</eLinkResult>"#;

#[tokio::test]
async fn failed_batch_does_not_sink_the_surviving_batch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::UrlEncoded(
            "term".into(),
            "Jane Doe[Author]".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"esearchresult": {"idlist": ["100", "200"]}}"#)
        .create_async()
        .await;
    // batch size 1 splits the fetch into one request per pmid
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "100".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(SINGLE_EFETCH_BODY)
        .create_async()
        .await;
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "200".into()))
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("GET", "/elink.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "100".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(SINGLE_ELINK_BODY)
        .create_async()
        .await;
    server
        .mock("GET", "/elink.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "200".into()))
        .with_status(500)
        .create_async()
        .await;

    let settings = PubMedSettings {
        batch_size: 1,
        batch_delay_ms: 0,
        ..Default::default()
    };
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();

    let article_count =
        publications::process_entry(&client, &store, &settings, &entry("42", "Jane Doe"))
            .await
            .unwrap();
    assert_eq!(article_count, 1);

    // only the surviving batch's article made it into the profile
    let profile = store.profile("42").unwrap();
    assert_eq!(profile.total_articles, 1);
    assert_eq!(profile.articles[0].pmid, "100");
    assert_eq!(profile.total_citations, 5);
    assert_eq!(profile.average_citations_per_article, 5.0);
}

#[tokio::test]
async fn zero_batch_size_still_fetches() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"esearchresult": {"idlist": ["100"]}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "100".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(SINGLE_EFETCH_BODY)
        .create_async()
        .await;
    server
        .mock("GET", "/elink.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "100".into()))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(SINGLE_ELINK_BODY)
        .create_async()
        .await;

    // a misconfigured zero batch size is clamped, not a panic
    let settings = PubMedSettings {
        batch_size: 0,
        batch_delay_ms: 0,
        ..Default::default()
    };
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();

    let article_count =
        publications::process_entry(&client, &store, &settings, &entry("42", "Jane Doe"))
            .await
            .unwrap();
    assert_eq!(article_count, 1);
    assert_eq!(store.profile("42").unwrap().total_citations, 5);
}

#[tokio::test]
async fn rerun_overwrites_to_an_identical_profile() {
    let mut server = mockito::Server::new_async().await;
    mock_full_pipeline(&mut server).await;

    let settings = test_settings();
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();
    let roster_entry = entry("42", "Jane Doe");

    publications::process_entry(&client, &store, &settings, &roster_entry)
        .await
        .unwrap();
    let first = store.profile("42").unwrap();

    publications::process_entry(&client, &store, &settings, &roster_entry)
        .await
        .unwrap();
    let second = store.profile("42").unwrap();

    assert_eq!(first, second);
    assert_eq!(store.profile_count(), 1);
}

#[tokio::test]
async fn empty_search_records_failure_and_writes_nothing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"esearchresult": {"idlist": []}}"#)
        .create_async()
        .await;

    let settings = test_settings();
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();
    let mut reporter = FailureReporter::new();

    let roster = vec![entry("42", "Jane Doe")];
    publications::run(&client, &store, &settings, &roster, &mut reporter).await;

    assert_eq!(reporter.len(), 1);
    assert_eq!(reporter.failures()[0].reason, "No publications found");
    assert_eq!(store.profile_count(), 0);
}

#[tokio::test]
async fn failed_detail_fetch_empties_the_entry() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"esearchresult": {"idlist": ["100"]}}"#)
        .create_async()
        .await;
    // efetch falls over entirely; the lone batch is dropped
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let settings = test_settings();
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();

    let result =
        publications::process_entry(&client, &store, &settings, &entry("42", "Jane Doe")).await;
    match result {
        Err(EntryError::Empty(reason)) => assert_eq!(reason, "No article data retrieved"),
        other => panic!("expected empty-result failure, got {:?}", other.map(|_| ())),
    }
    assert_eq!(store.profile_count(), 0);
}

#[tokio::test]
async fn search_transport_failure_is_typed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let settings = test_settings();
    let client = PubMedClient::new(&settings).with_base_url(server.url());
    let store = MemoryStore::new();

    let result =
        publications::process_entry(&client, &store, &settings, &entry("42", "Jane Doe")).await;
    assert!(matches!(result, Err(EntryError::Transport(_))));
}
