use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::Agent;

use super::wire::{
    AlignmentRequest, AlignmentResponse, ChainAnnotationsResponse,
    MasterAlignment, StructureProfile,
};
use super::DataService;
use crate::error::SyncError;
use crate::options::ServiceOptions;
use crate::structure::ChainRef;

/// [`DataService`] backed by the REST API over HTTP.
pub struct HttpDataService {
    agent: Agent,
    base_url: String,
}

impl HttpDataService {
    /// Build a client for `options.base_url` with a global request timeout.
    #[must_use]
    pub fn new(options: &ServiceOptions) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(options.timeout_secs)))
            .build();
        Self {
            agent: config.into(),
            base_url: options.base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body. Returns the failure text on
    /// error so callers can wrap it in their own error class.
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let body = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| format!("GET {url}: {e}"))?
            .into_body()
            .read_to_string()
            .map_err(|e| format!("failed to read response from {url}: {e}"))?;
        serde_json::from_str(&body)
            .map_err(|e| format!("malformed response from {url}: {e}"))
    }

    fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        what: String,
    ) -> Result<T, SyncError> {
        self.get_json(path)
            .map_err(|message| SyncError::Fetch { what, message })
    }
}

impl DataService for HttpDataService {
    fn align(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentResponse, SyncError> {
        let url = self.url("msa/sequence");
        let payload = serde_json::to_string(request)
            .map_err(|e| SyncError::Alignment(e.to_string()))?;
        log::debug!(
            "POST {url} ({} residues)",
            request.sequence.chars().count()
        );

        let body = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(&payload)
            .map_err(|e| SyncError::Alignment(format!("POST {url}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| SyncError::Alignment(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            SyncError::Alignment(format!("malformed response: {e}"))
        })
    }

    fn master_alignment(&self) -> Result<MasterAlignment, SyncError> {
        self.fetch("msa/master", "master alignment".to_owned())
    }

    fn chain_annotations(
        &self,
        chain: &ChainRef,
    ) -> Result<ChainAnnotationsResponse, SyncError> {
        self.fetch(
            &format!(
                "annotations/polymer/{}/{}/all",
                chain.pdb_id, chain.chain_id
            ),
            format!("annotations for {chain}"),
        )
    }

    fn structure_profile(
        &self,
        rcsb_id: &str,
    ) -> Result<StructureProfile, SyncError> {
        self.fetch(
            &format!("structures/{}/profile", rcsb_id.to_uppercase()),
            format!("profile for {rcsb_id}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let service = HttpDataService::new(&ServiceOptions {
            base_url: "http://localhost:8000/api/".into(),
            timeout_secs: 5,
        });
        assert_eq!(service.base_url(), "http://localhost:8000/api");
        assert_eq!(
            service.url("/msa/master"),
            "http://localhost:8000/api/msa/master"
        );
    }

    #[test]
    fn unreachable_backend_is_an_alignment_error() {
        let service = HttpDataService::new(&ServiceOptions {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
        });
        let request = AlignmentRequest {
            sequence: "MKV".into(),
            sequence_id: None,
            auth_seq_ids: None,
            annotations: None,
        };
        assert!(matches!(
            service.align(&request),
            Err(SyncError::Alignment(_))
        ));
        assert!(matches!(
            service.master_alignment(),
            Err(SyncError::Fetch { .. })
        ));
    }
}
