// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch conversion with per-element failure isolation
//!
//! Extraction runs in parallel: elements share no mutable state and every
//! element gets its own [`ExtractionContext`]. Reconstruction mutates a
//! single host document and stays sequential.

use crate::config::ConversionConfig;
use crate::context::ExtractionContext;
use crate::error::Result;
use crate::reconstruct::{ElementReconstructor, Reconstructed};
use crate::schema::SchemaElement;
use bim_bridge_core::{HostDocument, HostElement, HostId};
use rayon::prelude::*;
use uuid::Uuid;

/// A host element that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ElementFailure {
    pub host_id: HostId,
    pub reason: String,
}

/// A schema element that could not be rebuilt in the host
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReconstructionFailure {
    pub element: Uuid,
    pub kind: &'static str,
    pub reason: String,
}

pub type ExtractionOutcome = std::result::Result<Vec<SchemaElement>, ElementFailure>;
pub type ReconstructionOutcome = std::result::Result<Reconstructed, ReconstructionFailure>;

/// Convert one host element with a fresh context
pub fn extract_element(config: &ConversionConfig, element: &HostElement) -> Result<Vec<SchemaElement>> {
    ExtractionContext::new(config).extract(element)
}

/// Convert every element, one outcome per input in input order
pub fn extract_batch(config: &ConversionConfig, elements: &[HostElement]) -> Vec<ExtractionOutcome> {
    let start = std::time::Instant::now();

    let run = || -> Vec<ExtractionOutcome> {
        elements
            .par_iter()
            .map(|element| {
                extract_element(config, element).map_err(|err| {
                    tracing::warn!(element = %element.id(), error = %err, "Element extraction failed");
                    ElementFailure {
                        host_id: element.id(),
                        reason: err.to_string(),
                    }
                })
            })
            .collect()
    };

    let outcomes = if config.worker_threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(err) => {
                tracing::warn!(error = %err, "Could not build worker pool, using the global pool");
                run()
            }
        }
    } else {
        run()
    };

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    let produced: usize = outcomes.iter().filter_map(|o| o.as_ref().ok()).map(Vec::len).sum();
    tracing::info!(
        elements = elements.len(),
        converted = elements.len() - failed,
        failed,
        schema_elements = produced,
        time_ms = start.elapsed().as_millis(),
        "Batch extraction complete"
    );
    outcomes
}

/// Rebuild every element in order against one document. A failed element
/// leaves whatever it already created in place and does not stop the batch.
pub fn reconstruct_batch<D: HostDocument + ?Sized>(
    config: &ConversionConfig,
    document: &mut D,
    elements: &[SchemaElement],
) -> Vec<ReconstructionOutcome> {
    let reconstructor = ElementReconstructor::new(config);
    let outcomes: Vec<ReconstructionOutcome> = elements
        .iter()
        .map(|element| {
            reconstructor.reconstruct(document, element).map_err(|err| {
                tracing::warn!(
                    element = %element.id(),
                    kind = element.kind(),
                    error = %err,
                    "Element reconstruction failed"
                );
                ReconstructionFailure {
                    element: element.id(),
                    kind: element.kind(),
                    reason: err.to_string(),
                }
            })
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    tracing::info!(
        elements = elements.len(),
        reconstructed = elements.len() - failed,
        failed,
        "Batch reconstruction complete"
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_bridge_core::{HostCurve, HostFramingMember, HostSolid, HostWall, SectionShape, Xyz};

    fn beam(id: i64) -> HostElement {
        HostElement::Framing(HostFramingMember {
            id: HostId(id),
            name: format!("B-{}", id),
            type_name: "W10x12".to_string(),
            level_name: None,
            structural_type: "Beam".to_string(),
            section_shape: SectionShape::IParallelFlange,
            section_width: Some(0.4),
            section_height: Some(0.8),
            driving_curve: HostCurve::line(Xyz::ZERO, Xyz::new(12.0, 0.0, 0.0)),
            swept_profile: None,
            solid: Some(HostSolid { faces: Vec::new() }),
            start_extension: 0.0,
            end_extension: 0.0,
            bend_angle: 0.0,
        })
    }

    fn basic_wall(id: i64) -> HostElement {
        HostElement::Wall(HostWall {
            id: HostId(id),
            name: "Basic".to_string(),
            type_name: "Generic 8\"".to_string(),
            profile_loops: Vec::new(),
            curtain_grid: None,
        })
    }

    #[test]
    fn test_failures_do_not_abort_the_batch() {
        let config = ConversionConfig::default();
        let elements = vec![beam(1), basic_wall(2), beam(3)];
        let outcomes = extract_batch(&config, &elements);

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(&outcomes[0], Ok(e) if e.len() == 1 && e[0].kind() == "beam"));
        let failure = outcomes[1].as_ref().unwrap_err();
        assert_eq!(failure.host_id, HostId(2));
        assert!(failure.reason.contains("curtain grid"), "{}", failure.reason);
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn test_dedicated_worker_pool_keeps_order() {
        let config = ConversionConfig {
            worker_threads: 2,
            ..Default::default()
        };
        let elements: Vec<HostElement> = (0..16).map(beam).collect();
        let outcomes = extract_batch(&config, &elements);

        for (i, outcome) in outcomes.iter().enumerate() {
            let Ok(converted) = outcome else {
                panic!("element {} failed", i);
            };
            let SchemaElement::Beam(beam) = &converted[0] else {
                panic!("element {} is not a beam", i);
            };
            assert!(beam.identity.starts_with(&format!("B-{},", i)));
        }
    }
}
