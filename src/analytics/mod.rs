//! Analytical aggregation pipelines over the GlobalMarket collections.
//!
//! The pipelines are plain data handed to the server; nothing here evaluates a
//! stage. Results are streamed back one document at a time.

pub mod pipelines;

use crate::database::traits::{DocumentStream, ReadOperations};
use crate::{AdminError, AdminResult};
use bson::Document;
use futures_util::TryStreamExt;
use serde_derive::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsPipeline {
    pub number: u32,
    pub title: String,
    /// Collection the pipeline is run against.
    pub collection: String,
    pub stages: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub number: u32,
    pub documents: usize,
    pub error: Option<String>,
}

/// Hooks for presenting pipeline progress. All methods default to doing nothing.
pub trait PipelineObserver {
    fn started(&mut self, _pipeline: &AnalyticsPipeline) {}
    fn document(&mut self, _pipeline: &AnalyticsPipeline, _document: &Document) {}
    fn finished(&mut self, _pipeline: &AnalyticsPipeline, _summary: &PipelineSummary) {}
}

/// Starts one pipeline on its collection and hands back the unread result stream.
pub async fn run_pipeline<D>(db: &D, pipeline: &AnalyticsPipeline) -> AdminResult<DocumentStream>
where
    D: ReadOperations + Sync + ?Sized,
{
    db.aggregate(&pipeline.collection, pipeline.stages.clone()).await
}

/// Runs the pipelines in order. A failing pipeline is reported in its summary and
/// the next one still runs.
pub async fn run_pipelines<D, O>(db: &D, pipelines: &[AnalyticsPipeline], observer: &mut O) -> Vec<PipelineSummary>
where
    D: ReadOperations + Sync + ?Sized,
    O: PipelineObserver,
{
    let mut summaries = Vec::with_capacity(pipelines.len());

    for pipeline in pipelines {
        info!("PIPELINE {}: {}", pipeline.number, pipeline.title);
        observer.started(pipeline);

        let mut documents = 0;
        let result: AdminResult<()> = async {
            let mut stream = run_pipeline(db, pipeline).await?;
            while let Some(document) = stream.try_next().await? {
                documents += 1;
                observer.document(pipeline, &document);
            }
            Ok(())
        }
        .await;

        let summary = PipelineSummary {
            number: pipeline.number,
            documents,
            error: result.err().map(|e| e.to_string()),
        };
        match &summary.error {
            None => info!("Pipeline {} completed ({} documents)", pipeline.number, documents),
            Some(e) => error!("Pipeline {} failed: {}", pipeline.number, e),
        }

        observer.finished(pipeline, &summary);
        summaries.push(summary);
    }

    summaries
}

/// Renders a result document as indented relaxed extended JSON.
pub fn render_document(document: &Document) -> AdminResult<String> {
    let value = bson::Bson::Document(document.clone()).into_relaxed_extjson();
    serde_json::to_string_pretty(&value).map_err(AdminError::from)
}

#[cfg(test)]
mod tests {
    use super::pipelines::pipelines;
    use super::*;
    use crate::database::memory::MemoryDatabase;
    use bson::doc;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl PipelineObserver for Recorder {
        fn started(&mut self, pipeline: &AnalyticsPipeline) {
            self.events.push(format!("start {}", pipeline.number));
        }

        fn document(&mut self, pipeline: &AnalyticsPipeline, document: &Document) {
            let city = document.get_str("city").unwrap_or("?");
            self.events.push(format!("doc {} {}", pipeline.number, city));
        }

        fn finished(&mut self, pipeline: &AnalyticsPipeline, summary: &PipelineSummary) {
            self.events.push(format!("end {} {}", pipeline.number, summary.documents));
        }
    }

    fn first_stage_operator(pipeline: &AnalyticsPipeline) -> &str {
        pipeline.stages[0]
            .keys()
            .next()
            .map(String::as_str)
            .expect("Stage should have an operator")
    }

    #[test]
    fn test_pipeline_catalog() {
        let all = pipelines();

        let shape: Vec<(u32, &str, &str)> = all
            .iter()
            .map(|p| (p.number, p.collection.as_str(), first_stage_operator(p)))
            .collect();
        assert_eq!(
            shape,
            vec![
                (1, "sales", "$lookup"),
                (2, "products", "$match"),
                (3, "products", "$project"),
                (4, "sales", "$group"),
                (5, "sales", "$match"),
            ]
        );
    }

    #[test]
    fn test_result_limits() {
        let limits: Vec<Option<i32>> = pipelines()
            .iter()
            .map(|p| p.stages.last().and_then(|stage| stage.get_i32("$limit").ok()))
            .collect();

        assert_eq!(limits, vec![Some(20), Some(10), None, Some(15), Some(10)]);
    }

    #[test]
    fn test_price_buckets() {
        let pipeline = pipelines::price_range_distribution();
        let bucket = pipeline.stages[1].get_document("$bucket").expect("Second stage should bucket");

        let boundaries: Vec<i32> = bucket
            .get_array("boundaries")
            .expect("Bucket should have boundaries")
            .iter()
            .filter_map(|b| b.as_i32())
            .collect();
        assert_eq!(boundaries, vec![0, 500, 1000, 2000, 5000, 10000, 50000]);
        assert_eq!(bucket.get_str("default").ok(), Some("50000+"));
    }

    #[tokio::test]
    async fn test_run_pipelines_streams_documents_in_order() {
        let db = MemoryDatabase::new()
            .with_documents("sales", vec![doc! { "city": "Pune" }, doc! { "city": "Delhi" }]);
        let selected = vec![pipelines::sales_by_city()];
        let mut recorder = Recorder::default();

        let summaries = run_pipelines(&db, &selected, &mut recorder).await;

        assert_eq!(summaries, vec![PipelineSummary { number: 5, documents: 2, error: None }]);
        assert_eq!(
            recorder.events,
            vec![
                "start 5".to_string(),
                "doc 5 Pune".to_string(),
                "doc 5 Delhi".to_string(),
                "end 5 2".to_string(),
            ]
        );

        let sent = db.pipelines();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "sales");
        assert_eq!(sent[0].1, selected[0].stages);
    }

    #[tokio::test]
    async fn test_failing_pipeline_does_not_stop_the_rest() {
        let db = MemoryDatabase::new().failing_aggregations();
        let mut recorder = Recorder::default();

        let summaries = run_pipelines(&db, &pipelines(), &mut recorder).await;

        assert_eq!(summaries.len(), 5);
        assert!(summaries.iter().all(|s| s.error.is_some() && s.documents == 0));
    }

    #[test]
    fn test_render_document_uses_relaxed_json() {
        let rendered = render_document(&doc! { "city": "Pune", "total_orders": 3_i32 })
            .expect("Document should render");

        let value: serde_json::Value = serde_json::from_str(&rendered).expect("Output should be JSON");
        assert_eq!(value["city"], "Pune");
        assert_eq!(value["total_orders"], 3);
    }
}
