//! Monitoring policies: deficit thresholds and dose curves.
//!
//! Soil sensors compare zone means against fixed thresholds and open one
//! CFP per deficit per scan. Doses step down as the measured level rises,
//! so a nearly-dry zone gets a large dose and a borderline zone a top-up.

use agrimesh_types::{CropStage, DroneReading, SoilReading, TaskKind};

/// Zone mean moisture at or below which irrigation is requested.
pub const MOISTURE_THRESHOLD: f64 = 65.0;
/// Zone mean nutrients at or below which fertilization is requested.
pub const NUTRIENTS_THRESHOLD: f64 = 60.0;

/// Irrigation dose in millimetres for a measured zone moisture.
pub fn irrigation_dose_mm(moisture: f64) -> f64 {
    if moisture <= 10.0 {
        25.0
    } else if moisture <= 20.0 {
        20.0
    } else if moisture <= 50.0 {
        10.0
    } else if moisture <= 60.0 {
        7.0
    } else {
        4.0
    }
}

/// Fertilizer dose in nutrient points for a measured zone level.
pub fn fertilizer_dose(nutrients: f64) -> f64 {
    if nutrients <= 10.0 {
        10.0
    } else if nutrients <= 20.0 {
        7.0
    } else if nutrients <= 50.0 {
        5.0
    } else if nutrients <= 60.0 {
        3.0
    } else {
        2.0
    }
}

/// Field work a soil scan calls for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilAction {
    /// Irrigation or fertilization.
    pub task: TaskKind,
    /// The dose to apply per cell.
    pub dose: f64,
}

/// Evaluate a soil reading against the deficit thresholds.
///
/// At most one action per quantity, so a scan yields zero, one, or two
/// actions.
pub fn evaluate_soil(reading: &SoilReading) -> Vec<SoilAction> {
    let mut actions = Vec::with_capacity(2);
    if reading.moisture <= MOISTURE_THRESHOLD {
        actions.push(SoilAction {
            task: TaskKind::Irrigation,
            dose: irrigation_dose_mm(reading.moisture),
        });
    }
    if reading.nutrients <= NUTRIENTS_THRESHOLD {
        actions.push(SoilAction {
            task: TaskKind::Fertilize,
            dose: fertilizer_dose(reading.nutrients),
        });
    }
    actions
}

/// Field work an aerial observation calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAction {
    /// The cell holds a mature crop: request a harvest.
    Harvest,
    /// The cell is empty: request planting.
    Plant,
    /// The cell is infested: treat it with pesticide.
    Pesticide,
}

/// Evaluate one aerial cell observation.
pub fn evaluate_crop(reading: &DroneReading) -> Vec<CropAction> {
    let mut actions = Vec::with_capacity(2);
    match reading.crop_stage {
        CropStage::Mature => actions.push(CropAction::Harvest),
        CropStage::Empty => actions.push(CropAction::Plant),
        CropStage::Seed | CropStage::Germinating | CropStage::Vegetative => {}
    }
    if reading.pest_present {
        actions.push(CropAction::Pesticide);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimesh_types::CropKind;

    #[test]
    fn dose_curves_step_down() {
        assert_eq!(irrigation_dose_mm(5.0), 25.0);
        assert_eq!(irrigation_dose_mm(15.0), 20.0);
        assert_eq!(irrigation_dose_mm(40.0), 10.0);
        assert_eq!(irrigation_dose_mm(55.0), 7.0);
        assert_eq!(irrigation_dose_mm(64.0), 4.0);
        assert_eq!(fertilizer_dose(8.0), 10.0);
        assert_eq!(fertilizer_dose(45.0), 5.0);
        assert_eq!(fertilizer_dose(58.0), 3.0);
    }

    #[test]
    fn healthy_soil_needs_nothing() {
        let reading = SoilReading { temperature: 22.0, nutrients: 75.0, moisture: 70.0 };
        assert!(evaluate_soil(&reading).is_empty());
    }

    #[test]
    fn nutrient_deficit_triggers_exactly_one_fertilize_action() {
        let reading = SoilReading { temperature: 22.0, nutrients: 50.0, moisture: 70.0 };
        let actions = evaluate_soil(&reading);
        assert_eq!(
            actions,
            vec![SoilAction { task: TaskKind::Fertilize, dose: 5.0 }]
        );
    }

    #[test]
    fn double_deficit_yields_two_actions() {
        let reading = SoilReading { temperature: 22.0, nutrients: 15.0, moisture: 12.0 };
        let actions = evaluate_soil(&reading);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions.first().map(|a| a.task), Some(TaskKind::Irrigation));
    }

    #[test]
    fn mature_infested_cell_needs_harvest_and_pesticide() {
        let reading = DroneReading {
            crop_stage: CropStage::Mature,
            crop_kind: Some(CropKind::Wheat),
            pest_present: true,
        };
        let actions = evaluate_crop(&reading);
        assert_eq!(actions, vec![CropAction::Harvest, CropAction::Pesticide]);
    }

    #[test]
    fn growing_cell_is_left_alone() {
        let reading = DroneReading {
            crop_stage: CropStage::Vegetative,
            crop_kind: Some(CropKind::Carrot),
            pest_present: false,
        };
        assert!(evaluate_crop(&reading).is_empty());
    }
}
