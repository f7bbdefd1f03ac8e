// Integration tests for SkillMatch
use skillmatch::prelude::*;
use std::io::Write;
use std::sync::Arc;

fn assessment_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(1u64, "Numerical Reasoning", "Measures the ability to interpret numerical data, charts and tables"),
        CatalogItem::new(2u64, "Verbal Reasoning", "Measures understanding of written passages and arguments"),
        CatalogItem::new(3u64, "Situational Judgement Test", "Presents realistic workplace scenarios and asks how you would respond"),
        CatalogItem::new(4u64, "Leadership Potential Assessment", "Assesses leadership potential and the ability to motivate a team"),
        CatalogItem::new(5u64, "Cognitive Ability Test", "General problem solving, logic and pattern recognition"),
        CatalogItem::new(6u64, "Personality Questionnaire", "Describes preferred behaviours and working style"),
        CatalogItem::new(7u64, "Coding Simulation", "Hands-on programming exercise in a browser IDE"),
    ]
}

async fn start(items: Vec<CatalogItem>) -> Result<RecommendationService> {
    RecommendationService::start(items, Arc::new(HashingEncoder::new()), ServiceConfig::default()).await
}

#[tokio::test]
async fn test_numeric_query_prefers_numerical_test() {
    let items = vec![
        CatalogItem::new(1u64, "Numerical Reasoning Test", "measures numerical ability"),
        CatalogItem::new(2u64, "Leadership Survey", "assesses leadership potential"),
    ];
    let service = start(items).await.unwrap();

    let results = service.recommend("numeric aptitude test", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].item.name, "Numerical Reasoning Test");
    assert_eq!(results[1].item.name, "Leadership Survey");
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn test_identical_descriptions_keep_catalog_order() {
    let items = vec![
        CatalogItem::new("b", "Second Listed First", "team collaboration exercise"),
        CatalogItem::new("z", "Unrelated", "typing speed"),
        CatalogItem::new("a", "Listed Later", "team collaboration exercise"),
    ];
    let service = start(items).await.unwrap();

    for query in ["collaboration", "team", "anything at all", "typing"] {
        let results = service.recommend(query, 3).await.unwrap();
        let twins: Vec<_> = results
            .iter()
            .filter(|r| r.item.description == "team collaboration exercise")
            .collect();
        assert_eq!(twins.len(), 2);
        assert_eq!(twins[0].score, twins[1].score, "query {:?}", query);
        assert_eq!(twins[0].item.id, ItemId::from("b"), "query {:?}", query);
        assert_eq!(twins[1].item.id, ItemId::from("a"), "query {:?}", query);
    }
}

#[tokio::test]
async fn test_result_length_and_ordering() {
    let service = start(assessment_catalog()).await.unwrap();
    let size = service.index().len();

    for top_n in [1, 3, size, size + 10] {
        let results = service
            .recommend("graduate analyst comfortable with numbers and charts", top_n)
            .await
            .unwrap();
        assert_eq!(results.len(), top_n.min(size));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
    }
}

#[tokio::test]
async fn test_repeated_queries_are_identical() {
    let service = start(assessment_catalog()).await.unwrap();
    let query = "people manager who can motivate a team";

    let first = service.recommend(query, 5).await.unwrap();
    for _ in 0..5 {
        assert_eq!(service.recommend(query, 5).await.unwrap(), first);
    }
    assert_eq!(first[0].item.name, "Leadership Potential Assessment");
}

#[tokio::test]
async fn test_item_embedding_as_query_ranks_itself_first() {
    let encoder = HashingEncoder::new();
    let index = CorpusIndex::build(assessment_catalog(), &encoder).unwrap();

    for position in 0..index.len() {
        let (item, embedding) = index.get(position).unwrap();
        let results = skillmatch::rank(embedding, &index, 1).unwrap();
        assert_eq!(&results[0].item, item);
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }
}

#[tokio::test]
async fn test_invalid_requests() {
    let service = start(assessment_catalog()).await.unwrap();

    assert!(matches!(service.recommend("", 5).await, Err(Error::InvalidArgument(_))));
    assert!(matches!(service.recommend("numbers", 0).await, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_empty_catalog_fails() {
    assert!(matches!(start(Vec::new()).await, Err(Error::EmptyCatalog)));
    assert!(matches!(
        CorpusIndex::build(Vec::new(), &HashingEncoder::new()),
        Err(Error::EmptyCatalog)
    ));
}

#[tokio::test]
async fn test_csv_catalog_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        "Product Name,Description\n\
         Numerical Reasoning,Measures numerical ability using charts and tables\n\
         Verbal Reasoning,Measures understanding of written text\n\
         Leadership Potential Assessment,Assesses leadership potential\n"
    )
    .unwrap();
    drop(file);

    let items = CatalogLoader::load(&path).unwrap();
    assert_eq!(items.len(), 3);

    let service = start(items).await.unwrap();
    let results = service.recommend_default("written comprehension of text").await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].item.name, "Verbal Reasoning");

    let book = SampleQuestionBook::builtin();
    assert!(matches!(book.view(&results[0].item, true), SampleView::Questions(_)));
    assert_eq!(book.view(&results[0].item, false), SampleView::Hidden);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_index() {
    let service = Arc::new(start(assessment_catalog()).await.unwrap());
    let expected = service.recommend("logic puzzles", 3).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.recommend("logic puzzles", 3).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), expected);
    }
}
