//! The node/link graph: locations with their inbound and outbound records.

use crate::config::FlowMapConfig;
use crate::error::{Error, Result};
use crate::model::{FlowRecord, FlowRow, GeoFeature, Location, NodeSeed};
use crate::projection::Equirectangular;
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    locations: Vec<Location>, // id is index
    index: HashMap<String, usize>,
}

impl FlowGraph {
    /// Build from prepared nodes and links. Every link endpoint must name a node.
    pub fn new(nodes: Vec<NodeSeed>, links: Vec<FlowRecord>) -> Result<Self> {
        let mut g = FlowGraph::default();
        for n in nodes {
            if g.index.contains_key(&n.id) {
                debug!("duplicate node {} ignored", n.id);
                continue;
            }
            g.push(Location::new(n.id, n.name));
        }
        for link in links {
            let s = g.ix(&link.source)?;
            let t = g.ix(&link.target)?;
            g.locations[s].outbounds.push(link.clone());
            g.locations[t].inbounds.push(link);
        }
        Ok(g)
    }

    /// Aggregate tabular rows: locations in first-seen order, repeated
    /// `(source, target)` pairs summed into one record.
    pub fn from_rows(rows: &[FlowRow]) -> Self {
        let mut nodes: Vec<NodeSeed> = Vec::new();
        let mut seen: HashMap<&str, ()> = HashMap::new();
        let mut links: Vec<FlowRecord> = Vec::new();
        let mut link_ix: HashMap<(&str, &str), usize> = HashMap::new();
        for row in rows {
            for (id, name) in [(&row.source_id, &row.source_name), (&row.target_id, &row.target_name)] {
                if seen.insert(id.as_str(), ()).is_none() {
                    nodes.push(NodeSeed { id: id.clone(), name: name.clone() });
                }
            }
            let key = (row.source_id.as_str(), row.target_id.as_str());
            match link_ix.get(&key) {
                Some(&i) => links[i].value += row.value,
                None => {
                    link_ix.insert(key, links.len());
                    links.push(FlowRecord {
                        source: row.source_id.clone(),
                        target: row.target_id.clone(),
                        value: row.value,
                    });
                }
            }
        }
        debug!("aggregated {} rows into {} nodes, {} links", rows.len(), nodes.len(), links.len());
        // every endpoint was registered above
        let mut g = FlowGraph::default();
        for n in nodes {
            g.push(Location::new(n.id, n.name));
        }
        for link in links {
            let s = g.index[&link.source];
            let t = g.index[&link.target];
            g.locations[s].outbounds.push(link.clone());
            g.locations[t].inbounds.push(link);
        }
        g
    }

    fn push(&mut self, loc: Location) {
        self.index.insert(loc.id.clone(), self.locations.len());
        self.locations.push(loc);
    }

    /// Index of a location id, or `UnknownLocation`.
    pub fn ix(&self, id: &str) -> Result<usize> {
        self.index.get(id).copied().ok_or_else(|| Error::unknown_location(id))
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.index.get(id).map(|&i| &self.locations[i])
    }

    pub fn location(&self, ix: usize) -> &Location {
        &self.locations[ix]
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.locations
            .iter()
            .flat_map(|l| l.outbounds.iter().map(|r| r.value))
            .filter(|v| v.is_finite())
            .reduce(f64::max)
    }

    /// Bind region features by id. Returns the ids left without a feature.
    pub fn attach_features(&mut self, features: &[GeoFeature]) -> Vec<String> {
        let by_id: HashMap<&str, &GeoFeature> = features.iter().map(|f| (f.id.as_str(), f)).collect();
        let mut missing = Vec::new();
        for loc in &mut self.locations {
            loc.feature = by_id.get(loc.id.as_str()).map(|f| (*f).clone());
            if loc.feature.is_none() {
                warn!("no region feature for location {} ({})", loc.id, loc.name);
                missing.push(loc.id.clone());
            }
        }
        missing
    }

    /// Recompute every position: projected centroid plus the configured
    /// nudge for the region's abbreviation.
    pub fn update_positions(&mut self, projection: &Equirectangular, config: &FlowMapConfig) {
        for loc in &mut self.locations {
            let centroid = loc.feature.as_ref().and_then(|f| projection.centroid(&f.geometry));
            match centroid {
                Some(c) => {
                    let nudge = config.label_offset(loc.abbr());
                    loc.x = c.x + nudge.dx;
                    loc.y = c.y + nudge.dy;
                    loc.positioned = true;
                }
                None => loc.positioned = false,
            }
        }
    }
}
