use serde::{Deserialize, Serialize};

/// Layer number, also used as the DXF layer name suffix.
pub type LayerId = u32;

pub const OUTLINE: LayerId = 1;
pub const ROW_ELECTRODES: LayerId = 10;
pub const ROW_TRACES: LayerId = 11;
pub const ROW_CHIP: LayerId = 12;
pub const COLUMN_ELECTRODES: LayerId = 20;
pub const COLUMN_TRACES: LayerId = 21;
pub const COLUMN_CHIP: LayerId = 22;

/// Conductor plane a layer is fabricated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// Row electrodes and traces.
    Bottom,
    /// Column electrodes and traces.
    Top,
    /// Reference geometry drawn on every plane.
    Both,
}

impl Plane {
    /// Whether a layer on `self` belongs in an export of `plane`.
    pub fn includes(self, plane: Plane) -> bool {
        self == Plane::Both || plane == Plane::Both || self == plane
    }
}

/// A drawing layer of the lens document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub plane: Plane,
    /// AutoCAD colour index used in DXF output.
    pub dxf_color: u8,
    pub color: LayerColor,
    pub fill_pattern: FillPattern,
    pub opacity: f32,
    pub visible: bool,
    pub description: String,
}

impl Layer {
    pub fn new(id: LayerId, name: &str, plane: Plane) -> Self {
        Self {
            id,
            name: name.to_string(),
            plane,
            dxf_color: 7,
            color: LayerColor::default(),
            fill_pattern: FillPattern::Solid,
            opacity: 0.7,
            visible: true,
            description: String::new(),
        }
    }

    pub fn with_dxf_color(mut self, aci: u8) -> Self {
        self.dxf_color = aci;
        self
    }

    pub fn with_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color = LayerColor { r, g, b };
        self
    }

    pub fn with_pattern(mut self, pattern: FillPattern) -> Self {
        self.fill_pattern = pattern;
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for LayerColor {
    fn default() -> Self {
        Self {
            r: 128,
            g: 128,
            b: 128,
        }
    }
}

impl LayerColor {
    pub fn to_f32_array(&self, opacity: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            opacity,
        ]
    }
}

/// Fill pattern for preview rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPattern {
    Solid,
    Hatched,
    Outline,
}

/// Ordered set of document layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// The seven layers of a two-plane lens: outline, then electrodes,
    /// traces and chip footprint for each plane.
    pub fn lens() -> Self {
        let mut stack = Self::new();
        stack.add_layer(
            Layer::new(OUTLINE, "OUTLINE", Plane::Both)
                .with_dxf_color(7)
                .with_color(230, 230, 230)
                .with_pattern(FillPattern::Outline)
                .with_description("Lens boundary"),
        );
        stack.add_layer(
            Layer::new(ROW_ELECTRODES, "ROW_ELECTRODES", Plane::Bottom)
                .with_dxf_color(5)
                .with_color(70, 110, 220)
                .with_description("Row electrode bodies"),
        );
        stack.add_layer(
            Layer::new(ROW_TRACES, "ROW_TRACES", Plane::Bottom)
                .with_dxf_color(4)
                .with_color(60, 190, 220)
                .with_description("Row conductors and guards"),
        );
        stack.add_layer(
            Layer::new(ROW_CHIP, "ROW_CHIP", Plane::Bottom)
                .with_dxf_color(6)
                .with_color(200, 80, 200)
                .with_pattern(FillPattern::Hatched),
        );
        stack.add_layer(
            Layer::new(COLUMN_ELECTRODES, "COLUMN_ELECTRODES", Plane::Top)
                .with_dxf_color(1)
                .with_color(220, 80, 70)
                .with_description("Column electrode bodies"),
        );
        stack.add_layer(
            Layer::new(COLUMN_TRACES, "COLUMN_TRACES", Plane::Top)
                .with_dxf_color(2)
                .with_color(230, 200, 60)
                .with_description("Column conductors and guard"),
        );
        stack.add_layer(
            Layer::new(COLUMN_CHIP, "COLUMN_CHIP", Plane::Top)
                .with_dxf_color(3)
                .with_color(90, 200, 90)
                .with_pattern(FillPattern::Hatched),
        );
        stack
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    /// Layers exported with `plane`, in stack order.
    pub fn layers_on(&self, plane: Plane) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |l| l.plane.includes(plane))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}
