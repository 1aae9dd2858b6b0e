#[cfg(test)]
mod tests {

    use std::collections::HashSet;
    use std::sync::Arc;

    use futures::lock::Mutex;
    use rand::distributions::Alphanumeric;
    use rand::{thread_rng, Rng};
    use uuid::Uuid;

    use crate::client::TaskClient;
    use crate::model::{Status, TaskDraft, TaskPatch};

    fn server_url() -> String {
        std::env::var("TASKBOARD_E2E_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
    }

    fn draft(title: String) -> TaskDraft {
        TaskDraft {
            title: Some(title),
            description: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_e2e_create_and_filter() {
        let marker: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        let mut handles = vec![];
        let shared_ids = Arc::new(Mutex::new(Vec::<Uuid>::new()));
        for x in 0..3 {
            handles.push(tokio::spawn(create_task(
                format!("{} task {}", marker, x),
                shared_ids.clone(),
            )));
        }
        futures::future::join_all(handles).await;

        // keyword matching is case-insensitive on the server side
        let client = TaskClient::new(&server_url()).unwrap();
        let list = client
            .list(Some(&marker.to_lowercase()), None)
            .await
            .unwrap();

        let ids_set: HashSet<Uuid> = shared_ids.lock().await.iter().cloned().collect();
        assert_eq!(ids_set.len(), 3);
        assert_eq!(
            list.iter().filter(|task| ids_set.contains(&task.id)).count(),
            3
        );
    }

    async fn create_task(title: String, ids: Arc<Mutex<Vec<Uuid>>>) {
        let client = TaskClient::new(&server_url()).unwrap();
        let task = client.create(&draft(title)).await.unwrap();
        ids.lock().await.push(task.id);
    }

    #[tokio::test]
    async fn test_e2e_crud_roundtrip() {
        let client = TaskClient::new(&server_url()).unwrap();

        let task = client
            .create(&draft("roundtrip task".to_string()))
            .await
            .unwrap();
        assert_eq!(task.status, Status::Pending);

        let fetched = client.get(&task.id).await.unwrap();
        assert_eq!(fetched.id, task.id);

        let updated = client
            .update(&task.id, &TaskPatch::status_only(Status::Completed))
            .await
            .unwrap();
        assert_eq!(updated.status, Status::Completed);
        assert_eq!(updated.title, task.title);

        client.delete(&task.id).await.unwrap();

        let err = client.get(&task.id).await.unwrap_err();
        assert!(err.is_not_found());
        // re-delete reports not found as well
        let err = client.delete(&task.id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
