use std::collections::HashMap;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

use crate::core::models::{MonitorConfig, RegionName};
use crate::global_constants::LOG_TAG_TEMPLATES;

/// Reference images keyed by region. A region without an image can never match.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTemplates {
    templates: HashMap<RegionName, DynamicImage>,
}

impl ReferenceTemplates {
    pub fn load(config: &MonitorConfig) -> Self {
        let mut templates = HashMap::new();

        for monitored in &config.regions {
            let template_path = config.template_path_for(monitored.name);

            if !template_path.exists() {
                log::warn!(
                    "{} Template missing: {} ({:?})",
                    LOG_TAG_TEMPLATES,
                    monitored.name,
                    template_path
                );
                continue;
            }

            match image::open(&template_path) {
                Ok(template) => {
                    log::info!(
                        "{} Loaded {} template {}x{} from {:?}",
                        LOG_TAG_TEMPLATES,
                        monitored.name,
                        template.width(),
                        template.height(),
                        template_path
                    );
                    templates.insert(monitored.name, template);
                }
                Err(error) => {
                    log::warn!(
                        "{} Could not decode {} template {:?}: {}",
                        LOG_TAG_TEMPLATES,
                        monitored.name,
                        template_path,
                        error
                    );
                }
            }
        }

        Self { templates }
    }

    #[allow(dead_code)]
    pub fn from_images(images: impl IntoIterator<Item = (RegionName, DynamicImage)>) -> Self {
        Self {
            templates: images.into_iter().collect(),
        }
    }

    #[allow(dead_code)]
    pub fn contains(&self, name: RegionName) -> bool {
        self.templates.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Template resized to the region's dimensions and reduced to luma.
    pub fn prepared_for(&self, name: RegionName, width: u32, height: u32) -> Option<GrayImage> {
        let template = self.templates.get(&name)?;

        Some(
            template
                .resize_exact(width, height, FilterType::Triangle)
                .to_luma8(),
        )
    }
}
