//! Persistence backend reached over the service-family wire protocol.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::jobs::JobInfo;
use crate::pipelines::PipelineInfo;
use crate::resolve::ResolvedAddress;
use crate::wire::{RpcClient, RpcError};

use super::{PersistApi, PersistError, PersistenceBackend, REQUIRED_TABLES};

const SERVICE: &str = "persist";

/// Production backend talking to the persistence service.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemotePersistenceBackend;

impl PersistenceBackend for RemotePersistenceBackend {
    fn initialize_if_absent(
        &self,
        address: &ResolvedAddress,
        database: &str,
    ) -> Result<(), PersistError> {
        RpcClient::new(address.as_str())
            .call(
                SERVICE,
                "ensure-database",
                json!({ "database": database, "tables": REQUIRED_TABLES }),
            )
            .map(drop)
            .map_err(|source| PersistError::Initialize {
                address: address.to_string(),
                database: database.to_owned(),
                source,
            })
    }

    fn connect(
        &self,
        address: &ResolvedAddress,
        database: &str,
    ) -> Result<Arc<dyn PersistApi>, PersistError> {
        let store = RemoteStore::new(RpcClient::new(address.as_str()), database);
        store
            .client
            .call(SERVICE, "ping", json!({ "database": database }))
            .map_err(|source| PersistError::Connect {
                address: address.to_string(),
                database: database.to_owned(),
                source,
            })?;
        Ok(Arc::new(store))
    }
}

/// Connected handle forwarding record operations to the persistence service.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: RpcClient,
    database: String,
}

impl RemoteStore {
    /// Wraps a client bound to the persistence service.
    #[must_use]
    pub fn new(client: RpcClient, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    /// Database this handle operates on.
    #[must_use]
    pub fn database(&self) -> &str {
        self.database.as_str()
    }

    fn request<T>(&self, operation: &'static str, mut payload: Value) -> Result<T, PersistError>
    where
        T: DeserializeOwned,
    {
        if let Value::Object(fields) = &mut payload {
            fields.insert("database".to_owned(), Value::from(self.database.as_str()));
        }
        self.client
            .call_typed(SERVICE, operation, &payload)
            .map_err(|source: RpcError| PersistError::Operation { operation, source })
    }
}

impl PersistApi for RemoteStore {
    fn create_job_info(&self, info: &JobInfo) -> Result<(), PersistError> {
        self.request::<Value>("create-job-info", json!({ "job_info": info }))
            .map(drop)
    }

    fn update_job_info(&self, info: &JobInfo) -> Result<(), PersistError> {
        self.request::<Value>("update-job-info", json!({ "job_info": info }))
            .map(drop)
    }

    fn get_job_info(&self, id: &str) -> Result<Option<JobInfo>, PersistError> {
        self.request("get-job-info", json!({ "id": id }))
    }

    fn list_job_infos(&self, pipeline: Option<&str>) -> Result<Vec<JobInfo>, PersistError> {
        self.request("list-job-infos", json!({ "pipeline": pipeline }))
    }

    fn create_pipeline_info(&self, info: &PipelineInfo) -> Result<(), PersistError> {
        self.request::<Value>("create-pipeline-info", json!({ "pipeline_info": info }))
            .map(drop)
    }

    fn get_pipeline_info(&self, name: &str) -> Result<Option<PipelineInfo>, PersistError> {
        self.request("get-pipeline-info", json!({ "name": name }))
    }

    fn list_pipeline_infos(&self) -> Result<Vec<PipelineInfo>, PersistError> {
        self.request("list-pipeline-infos", json!({}))
    }

    fn delete_pipeline_info(&self, name: &str) -> Result<bool, PersistError> {
        #[derive(serde::Deserialize)]
        struct Deleted {
            deleted: bool,
        }
        self.request::<Deleted>("delete-pipeline-info", json!({ "name": name }))
            .map(|reply| reply.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use rstest::rstest;

    use crate::wire::RpcRequest;

    /// Answers each incoming call with a successful reply, recording requests.
    fn fake_service(
        calls: usize,
        reply: &'static str,
    ) -> (ResolvedAddress, thread::JoinHandle<Vec<RpcRequest>>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        let address = ResolvedAddress::verbatim(listener.local_addr().expect("addr").to_string());
        let handle = thread::spawn(move || {
            (0..calls)
                .map(|_| {
                    let (mut stream, _) = listener.accept().expect("accept");
                    let mut reader = BufReader::new(stream.try_clone().expect("clone"));
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("read request");
                    let response = format!(
                        "{{\"kind\":\"reply\",\"body\":{reply}}}\n{{\"kind\":\"exit\",\"status\":0}}\n"
                    );
                    stream.write_all(response.as_bytes()).expect("write");
                    RpcRequest::parse(line.as_bytes()).expect("parse request")
                })
                .collect()
        });
        (address, handle)
    }

    #[rstest]
    fn initialisation_then_connect_pings_the_database() {
        let (address, server) = fake_service(2, "{}");
        let store = super::super::initialize(&RemotePersistenceBackend, &address, "pachyderm")
            .expect("initialise should succeed");
        drop(store);

        let requests = server.join().expect("server join");
        let methods: Vec<&str> = requests.iter().map(RpcRequest::method).collect();
        assert_eq!(methods, vec!["ensure-database", "ping"]);
        let first = requests.first().expect("ensure-database request");
        assert_eq!(first.body["database"], "pachyderm");
        assert_eq!(first.body["tables"], json!(["jobs", "pipelines"]));
    }

    #[rstest]
    fn unreachable_backend_fails_initialisation() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        let address = ResolvedAddress::verbatim(listener.local_addr().expect("addr").to_string());
        drop(listener);

        let error = RemotePersistenceBackend
            .initialize_if_absent(&address, "pachyderm")
            .expect_err("nothing is listening");
        assert!(matches!(error, PersistError::Initialize { .. }));
    }

    #[rstest]
    fn missing_records_decode_as_none() {
        let (address, server) = fake_service(1, "null");
        let store = RemoteStore::new(RpcClient::new(address.as_str()), "pachyderm");
        let job = store.get_job_info("absent").expect("lookup should succeed");
        assert!(job.is_none());

        let requests = server.join().expect("server join");
        let request = requests.first().expect("one request");
        assert_eq!(request.body, json!({"database": "pachyderm", "id": "absent"}));
    }
}
