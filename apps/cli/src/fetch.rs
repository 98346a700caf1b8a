use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use quizcast_core::{
    Dispatch, ItemFailure, ModelClient, ModelRequest, Provider, QuizBatch, RawResponse,
    cache::{cache_dir_in, get_response_path, load_cached_response, save_response},
    process_quiz_items,
    prompt::quiz_prompt,
};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{info, warn};

pub struct FetchOptions {
    pub language: String,
    pub provider: Provider,
    pub force: bool,
    pub concurrency: usize,
    /// Root of the raw response cache, `None` disables caching.
    pub cache_root: Option<PathBuf>,
}

pub struct Fetched {
    pub responses: Vec<RawResponse>,
    pub cached: usize,
    /// Fresh model responses to write to the cache once they validate.
    pending: Vec<PendingSave>,
}

struct PendingSave {
    path: PathBuf,
    label: String,
    text: String,
}

/// Ask the model about every video, at most `concurrency` at a time.
///
/// Responses come back in the order of `urls`. The first failed call aborts
/// the calls still in flight and fails the whole request.
pub async fn fetch_quiz_responses(
    client: Arc<dyn ModelClient>,
    urls: &[String],
    options: &FetchOptions,
) -> Result<Fetched> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let prompt = Arc::new(quiz_prompt(&options.language));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.iter().enumerate() {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let prompt = Arc::clone(&prompt);
        let url = url.clone();
        let cache_path = options.cache_root.as_ref().map(|root| {
            get_response_path(&cache_dir_in(root, &url), &options.provider, &options.language)
        });
        let force = options.force;

        tasks.spawn(async move {
            if !force {
                if let Some(path) = &cache_path {
                    if let Some(text) = load_cached_response(path).await? {
                        return Ok((index, RawResponse::new(url, text), None, true));
                    }
                }
            }

            let _permit = semaphore.acquire_owned().await?;
            let request = ModelRequest::quiz(&url, prompt.as_ref().clone());
            let text = client
                .complete(&request)
                .await
                .with_context(|| format!("Error analyzing video {url}"))?;
            info!(%url, "model response received");

            let pending = cache_path.map(|path| PendingSave {
                path,
                label: url.clone(),
                text: text.clone(),
            });

            anyhow::Ok((index, RawResponse::new(url, text), pending, false))
        });
    }

    let mut slots: Vec<Option<RawResponse>> = vec![None; urls.len()];
    let mut pending = Vec::new();
    let mut cached = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok((index, response, save, from_cache)) => {
                if from_cache {
                    cached += 1;
                }
                pending.extend(save);
                slots[index] = Some(response);
            }
            Err(e) => {
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    let responses = slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .context("model call finished without a response")?;

    Ok(Fetched {
        responses,
        cached,
        pending,
    })
}

/// Run the quiz pipeline over fetched responses, then cache the fresh ones.
///
/// Nothing is written when any item fails, so a response that did not
/// validate is asked for again on the next run.
pub async fn process_and_cache<D: Dispatch>(
    fetched: Fetched,
    dispatch: &D,
) -> Result<Vec<QuizBatch>, ItemFailure> {
    let Fetched { responses, pending, .. } = fetched;
    let batches = process_quiz_items(responses, dispatch)?;

    for save in pending {
        if let Err(e) = save_response(&save.path, &save.text).await {
            warn!(url = %save.label, "failed to cache model response: {e}");
        }
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use quizcast_core::{ClientError, FailureKind, Sequential};

    use super::*;

    /// Answers with the video URL, slower for earlier videos so completion
    /// order is the reverse of request order.
    struct EchoClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelClient for EchoClient {
        async fn complete(&self, request: &ModelRequest) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let url = request.video_url.clone().unwrap_or_default();
            let n: u64 = url.trim_start_matches("video-").parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(50 - n * 10)).await;
            if url == "video-broken" {
                return Err(ClientError::EmptyResponse);
            }
            Ok(format!("response for {url}"))
        }
    }

    fn options(cache_root: Option<PathBuf>) -> FetchOptions {
        FetchOptions {
            language: "english".into(),
            provider: Provider::Gemini,
            force: false,
            concurrency: 3,
            cache_root,
        }
    }

    #[tokio::test]
    async fn responses_follow_request_order() {
        let client = Arc::new(EchoClient { calls: AtomicUsize::new(0) });
        let urls: Vec<String> = (0..5).map(|i| format!("video-{i}")).collect();

        let fetched = fetch_quiz_responses(client.clone(), &urls, &options(None))
            .await
            .unwrap();

        let labels: Vec<_> = fetched.responses.iter().map(|r| r.label.clone()).collect();
        assert_eq!(labels, urls);
        assert_eq!(fetched.responses[3].text, "response for video-3");
        assert_eq!(client.calls.load(Ordering::SeqCst), 5);
        assert_eq!(fetched.cached, 0);
    }

    #[tokio::test]
    async fn failed_call_names_the_video() {
        let client = Arc::new(EchoClient { calls: AtomicUsize::new(0) });
        let urls = vec!["video-1".to_string(), "video-broken".to_string()];

        let err = fetch_quiz_responses(client, &urls, &options(None))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Error analyzing video video-broken"));
    }

    /// Hands out canned replies in call order, repeating the last one.
    struct ScriptedClient {
        replies: Mutex<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(replies: &[&'static str]) -> Self {
            let mut replies = replies.to_vec();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(&self, _request: &ModelRequest) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.pop().unwrap()
            } else {
                replies[0]
            };
            Ok(reply.to_string())
        }
    }

    const VALID_QUIZ: &str = r#"Here you go: {"segments": [{
        "timestamp": "00:30",
        "question": "What melts ice?",
        "answers": ["Heat", "Salt water", "Wind", "Shade"],
        "praise": "Right!",
        "explanation": "Heat melts ice."
    }]}"#;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("quizcast-{name}-{}", std::process::id()))
    }

    #[tokio::test]
    async fn second_run_is_served_from_cache() {
        let root = temp_root("cache-hit");
        let client = Arc::new(ScriptedClient::new(&[VALID_QUIZ]));
        let urls = vec!["video-2".to_string()];

        let first = fetch_quiz_responses(client.clone(), &urls, &options(Some(root.clone())))
            .await
            .unwrap();
        process_and_cache(first, &Sequential).await.unwrap();

        let again = fetch_quiz_responses(client.clone(), &urls, &options(Some(root.clone())))
            .await
            .unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(again.cached, 1);
        assert_eq!(again.responses[0].text, VALID_QUIZ);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn unvalidated_response_is_not_cached() {
        let root = temp_root("cache-miss");
        let client = Arc::new(ScriptedClient::new(&["I could not watch that video.", VALID_QUIZ]));
        let urls = vec!["video-3".to_string()];

        let first = fetch_quiz_responses(client.clone(), &urls, &options(Some(root.clone())))
            .await
            .unwrap();
        let failure = process_and_cache(first, &Sequential).await.unwrap_err();
        assert_eq!(failure.label, "video-3");
        assert_eq!(failure.error.kind(), FailureKind::NoJsonFound);

        let second = fetch_quiz_responses(client.clone(), &urls, &options(Some(root.clone())))
            .await
            .unwrap();
        assert_eq!(second.cached, 0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        process_and_cache(second, &Sequential).await.unwrap();

        let third = fetch_quiz_responses(client.clone(), &urls, &options(Some(root.clone())))
            .await
            .unwrap();
        assert_eq!(third.cached, 1);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);

        let _ = std::fs::remove_dir_all(&root);
    }
}
