// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural framing to beams and back

use crate::context::ExtractionContext;
use crate::error::{Error, Result};
use crate::reconstruct::ElementReconstructor;
use crate::schema::{Beam, Material};
use bim_bridge_core::{
    feet_to_meters, CommandQueue, HostCommand, HostDocument, HostFramingMember, HostId,
    TypeCategory,
};
use bim_bridge_geometry::Curve;
use uuid::Uuid;

/// `"{name},{type},{level},{structural type}"`
pub fn beam_identity(member: &HostFramingMember) -> String {
    format!(
        "{},{},{},{}",
        member.name,
        member.type_name,
        member.level_name.as_deref().unwrap_or_default(),
        member.structural_type
    )
}

/// Framing type name recorded in a beam identity
pub fn identity_type_name(identity: &str) -> Option<&str> {
    identity.split(',').nth(1).filter(|name| !name.is_empty())
}

/// Host extensions are signed; only cutbacks become setbacks
fn setback(extension_feet: f64) -> f64 {
    if extension_feet < 0.0 {
        feet_to_meters(-extension_feet)
    } else {
        0.0
    }
}

impl ExtractionContext<'_> {
    pub fn extract_beam(&self, member: &HostFramingMember) -> Result<Beam> {
        let section = self.extractor.extract(member)?;
        tracing::debug!(
            member = %member.id,
            method = ?section.method,
            width = section.width,
            height = section.height,
            "Extracted beam section"
        );

        Ok(Beam {
            id: Uuid::new_v4(),
            curve: Curve::from_host(&member.driving_curve, self.curve_level_of_detail()),
            profile: section.profile,
            material: Material::steel(),
            start_setback: setback(member.start_extension),
            end_setback: setback(member.end_extension),
            rotation: member.bend_angle.to_degrees(),
            identity: beam_identity(member),
        })
    }
}

impl ElementReconstructor<'_> {
    /// Create a framing instance for `beam`, then set its bend angle and lift
    /// it by half the symbol height
    pub fn place_beam<D: HostDocument + ?Sized>(
        &self,
        queue: &mut CommandQueue<'_, D>,
        beam: &Beam,
    ) -> Result<HostId> {
        let symbols = queue.document().element_types(TypeCategory::StructuralFraming);
        let wanted = identity_type_name(&beam.identity);
        let symbol = wanted
            .and_then(|name| symbols.iter().find(|s| s.name == name))
            .or_else(|| {
                if let Some(name) = wanted {
                    tracing::warn!(framing_type = name, "Framing type not loaded, using the first one");
                }
                symbols.first()
            })
            .map(|s| s.id)
            .ok_or_else(|| Error::skipped(&beam.identity, "no structural framing type is loaded"))?;
        let level = queue
            .document()
            .levels()
            .first()
            .map(|l| l.id)
            .ok_or_else(|| Error::skipped(&beam.identity, "document has no levels"))?;

        let create = queue.push(HostCommand::CreateBeam {
            curve: beam.curve.to_host(),
            symbol,
            level,
        });
        let instance = queue
            .flush()?
            .result(create)?
            .created_id()
            .ok_or_else(|| Error::skipped(&beam.identity, "host created no framing instance"))?;

        let rotate = queue.push(HostCommand::SetBeamRotation {
            beam: instance,
            radians: beam.rotation.to_radians(),
        });
        queue.flush()?.result(rotate)?;

        match queue.document().min_symbol_height(symbol) {
            Some(height) => {
                let lift = queue.push(HostCommand::SetBeamZOffset {
                    beam: instance,
                    offset: height / 2.0,
                });
                queue.flush()?.result(lift)?;
            }
            None => tracing::warn!(beam = %instance, "Symbol height unknown, centerline offset not applied"),
        }

        tracing::debug!(beam = %instance, symbol = %symbol, "Placed beam");
        Ok(instance)
    }
}
