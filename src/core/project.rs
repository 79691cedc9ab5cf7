//! Geographic-to-screen projection
//!
//! `MapView` is a Web-Mercator viewport (center + zoom + pixel size) and the
//! only `Projector` the app ships. The network core never sees the viewport;
//! it only calls `project` through the trait, so any other map layer could
//! stand behind it.

use super::candle::GeoPoint;

/// Pixel position in the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Anything that can turn a geographic position into current screen pixels.
///
/// Must be cheap and synchronous; returns None while the projection is not
/// available (e.g. the map has no layout yet).
pub trait Projector {
    fn project(&self, geo: GeoPoint) -> Option<ScreenPos>;
}

/// Mercator latitude limit; poles are not representable.
const MAX_LAT: f64 = 85.051_128_78;
const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 19.0;

/// Web-Mercator viewport over the world map.
#[derive(Debug, Clone)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
    width: f32,
    height: f32,
}

impl MapView {
    /// World overview: centered on lat 20, lng 0 at zoom 2.
    pub fn world(width: f32, height: f32) -> Self {
        Self {
            center: GeoPoint { lat: 20.0, lng: 0.0 },
            zoom: 2.0,
            width,
            height,
        }
    }

    /// Returns true when the size actually changed.
    pub fn set_size(&mut self, width: f32, height: f32) -> bool {
        if (self.width - width).abs() < f32::EPSILON
            && (self.height - height).abs() < f32::EPSILON
        {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn world_from_geo(geo: GeoPoint, world: f64) -> (f64, f64) {
        let lat = geo.lat.clamp(-MAX_LAT, MAX_LAT);
        let x = (geo.lng + 180.0) / 360.0 * world;
        let lat_rad = lat.to_radians();
        let y = (1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln()) / std::f64::consts::PI)
            / 2.0
            * world;
        (x, y)
    }

    fn geo_from_world(x: f64, y: f64, world: f64) -> GeoPoint {
        let lng = x / world * 360.0 - 180.0;
        let n = std::f64::consts::PI * (1.0 - 2.0 * y / world);
        let lat = n.sinh().atan().to_degrees();
        GeoPoint { lat, lng }
    }

    /// Pan by a screen-space delta (drag direction, map follows the pointer).
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let world = self.world_size();
        let (cx, cy) = Self::world_from_geo(self.center, world);
        self.center = Self::geo_from_world(cx - dx as f64, cy - dy as f64, world);
    }

    /// Zoom by a factor, keeping the geographic point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: ScreenPos, factor: f64) {
        let old_world = self.world_size();
        let new_zoom = (self.zoom + factor.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let (cx, cy) = Self::world_from_geo(self.center, old_world);
        let ax = cx + (anchor.x - self.width / 2.0) as f64;
        let ay = cy + (anchor.y - self.height / 2.0) as f64;

        self.zoom = new_zoom;
        let ratio = self.world_size() / old_world;

        // The anchor's world point scales with the world; re-center so it
        // stays under the same pixel.
        let ncx = ax * ratio - (anchor.x - self.width / 2.0) as f64;
        let ncy = ay * ratio - (anchor.y - self.height / 2.0) as f64;
        self.center = Self::geo_from_world(ncx, ncy, self.world_size());
    }
}

impl Projector for MapView {
    fn project(&self, geo: GeoPoint) -> Option<ScreenPos> {
        if self.width <= 0.0 || self.height <= 0.0 {
            // Map not laid out yet
            return None;
        }
        if !geo.lat.is_finite() || !geo.lng.is_finite() {
            return None;
        }

        let world = self.world_size();
        let (px, py) = Self::world_from_geo(geo, world);
        let (cx, cy) = Self::world_from_geo(self.center, world);

        Some(ScreenPos::new(
            (self.width as f64 / 2.0 + (px - cx)) as f32,
            (self.height as f64 / 2.0 + (py - cy)) as f32,
        ))
    }
}
