#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::Notify;

use windwalker::models::*;
use windwalker::{ClientConfig, ClientError, DataService, HeadlessMap, MapSurface, MemoryHistory, Windwalker};

/// A request the scripted service received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(Option<i32>),
    Treaty(String),
    Search(String),
    Boundaries,
    Health,
}

/// In-memory data service with controllable latency and failures.
///
/// Requests are keyed `list:<year>` (`list:all` when unscoped),
/// `treaty:<id>`, `search:<query>`, `boundaries` and `health`. A held key
/// blocks its request until [`ScriptedService::release`]; a failing key
/// answers with a server error.
pub struct ScriptedService {
    treaties: Vec<Treaty>,
    boundaries: FeatureCollection,
    calls: Mutex<Vec<Call>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    failures: Mutex<HashSet<String>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            treaties: fixture_treaties(),
            boundaries: fixture_boundaries(),
            calls: Mutex::new(Vec::new()),
            holds: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
        }
    }

    pub fn hold(&self, key: &str) {
        self.holds
            .lock()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        if let Some(gate) = self.holds.lock().remove(key) {
            gate.notify_one();
        }
    }

    pub fn fail(&self, key: &str) {
        self.failures.lock().insert(key.to_string());
    }

    pub fn recover(&self, key: &str) {
        self.failures.lock().remove(key);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn list_calls(&self) -> Vec<Option<i32>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(year) => Some(year),
                _ => None,
            })
            .collect()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    async fn gate(&self, call: Call, key: String) -> Result<(), ClientError> {
        self.calls.lock().push(call);
        let hold = self.holds.lock().get(&key).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
        if self.failures.lock().contains(&key) {
            return Err(ClientError::Server(format!("scripted failure: {}", key)));
        }
        Ok(())
    }
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self::new()
    }
}

impl DataService for ScriptedService {
    async fn list_treaties(&self, year_end: Option<i32>) -> Result<TreatyList, ClientError> {
        let key = match year_end {
            Some(year) => format!("list:{}", year),
            None => "list:all".to_string(),
        };
        self.gate(Call::List(year_end), key).await?;

        let treaties: Vec<Treaty> = self
            .treaties
            .iter()
            .filter(|t| match year_end {
                Some(year) => t.signed_year().is_some_and(|signed| signed <= year),
                None => true,
            })
            .cloned()
            .collect();
        Ok(TreatyList {
            total: treaties.len(),
            treaties,
        })
    }

    async fn get_treaty(&self, id: &str) -> Result<Treaty, ClientError> {
        self.gate(Call::Treaty(id.to_string()), format!("treaty:{}", id))
            .await?;
        self.treaties
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Treaty {} not found", id)))
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        self.gate(Call::Search(query.to_string()), format!("search:{}", query))
            .await?;

        let needle = query.to_lowercase();
        let mut results: Vec<SearchResult> = self
            .treaties
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .map(|t| SearchResult::treaty(t.id.clone(), t.name.clone()))
            .collect();
        let tribes: BTreeSet<&str> = self
            .treaties
            .iter()
            .flat_map(|t| t.tribes.iter())
            .map(|tribe| tribe.name.as_str())
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();
        results.extend(
            tribes
                .into_iter()
                .map(|name| SearchResult::tribe(name.to_lowercase(), name)),
        );

        Ok(SearchResponse {
            query: Some(query.to_string()),
            total: results.len(),
            results,
        })
    }

    async fn boundaries(&self) -> Result<FeatureCollection, ClientError> {
        self.gate(Call::Boundaries, "boundaries".to_string()).await?;
        Ok(self.boundaries.clone())
    }

    async fn health(&self) -> Result<Health, ClientError> {
        self.gate(Call::Health, "health".to_string()).await?;
        Ok(Health {
            status: "healthy".to_string(),
            database: Some("connected".to_string()),
        })
    }
}

fn treaty(
    id: &str,
    name: &str,
    signed: Option<(i32, u32, u32)>,
    status: TreatyStatus,
    tribes: &[&str],
) -> Treaty {
    let mut t = Treaty::new(id, name);
    t.signed_date = signed.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
    t.status = status;
    t.certainty = Certainty::Verified;
    t.tribes = tribes
        .iter()
        .map(|name| TribeRef {
            id: name.to_lowercase(),
            name: name.to_string(),
        })
        .collect();
    t
}

pub fn fixture_treaties() -> Vec<Treaty> {
    use TreatyStatus::*;
    vec![
        treaty("a", "Treaty with the Delawares", Some((1778, 9, 17)), Active, &["Delaware"]),
        treaty("b", "Treaty of Hopewell", Some((1785, 11, 28)), Violated, &["Cherokee"]),
        treaty(
            "c",
            "Treaty of Greenville",
            Some((1795, 8, 3)),
            Active,
            &["Wyandot", "Delaware", "Shawnee", "Ottawa", "Chippewa"],
        ),
        treaty(
            "d",
            "Treaty of Chicago",
            Some((1833, 9, 26)),
            Violated,
            &["Potawatomi", "Ottawa", "Chippewa"],
        ),
        treaty(
            "e",
            "Treaty of Fort Laramie",
            Some((1851, 9, 17)),
            Violated,
            &["Sioux", "Cheyenne", "Arapaho"],
        ),
        treaty("f", "Treaty of Medicine Lodge", Some((1867, 10, 21)), Violated, &["Kiowa", "Comanche"]),
        treaty("g", "Unratified Cession", None, Unknown, &[]),
    ]
}

pub fn fixture_boundaries() -> FeatureCollection {
    [
        BoundaryFeature::new("Hopewell 1785", "#aa0000"),
        BoundaryFeature::new("Greenville, 1795", "#00aa00"),
        BoundaryFeature::new("Fort Laramie 1851", "#0000aa"),
        BoundaryFeature::new("Medicine Lodge 1867", "#aaaa00"),
        BoundaryFeature::new("Robinson Huron", "#555555"),
    ]
    .into_iter()
    .collect()
}

/// An engine over the scripted service, starting at `path`.
pub fn harness(path: &str) -> (Windwalker<ScriptedService>, Arc<HeadlessMap>) {
    let map = Arc::new(HeadlessMap::new());
    let surface: Arc<dyn MapSurface> = map.clone();
    let app = Windwalker::new(
        ScriptedService::new(),
        Arc::new(MemoryHistory::new(path)),
        surface,
        ClientConfig::default(),
    );
    (app, map)
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
