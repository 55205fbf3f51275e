//! View rendering preferences.
//!
//! `ViewParams` binds a [`ParameterObserver`] to the
//! `User parameter:BaseApp/Preferences/View` group and exposes one typed
//! getter/setter pair per parameter. The catalog and the accessors are
//! generated from a single table, so an accessor's type is the type of the
//! slot it reads.

use std::sync::{Arc, OnceLock};

use param_store::{Builder, ParameterGroup, ParameterScalar, ParameterStore, ParameterType};
use tracing::info;

use crate::color::Color;
use crate::error::Result;
use crate::observer::{ParameterObserver, ParameterObserverBuilder};
use crate::slot::Slot;

pub const VIEW_PARAMS_PATH: &str = "User parameter:BaseApp/Preferences/View";

/// One entry of the view parameter catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewParameter {
    pub key: &'static str,
    pub parameter_type: ParameterType,
}

pub struct ViewParams {
    observer: Arc<ParameterObserver>,
}

macro_rules! view_params {
    ($( $(#[$meta:meta])* $key:literal => $getter:ident, $setter:ident: $ty:ty = $default:expr; )*) => {
        const CATALOG: &[ViewParameter] = &[
            $( ViewParameter { key: $key, parameter_type: <$ty as ParameterScalar>::TYPE }, )*
        ];

        impl ViewParams {
            fn slots() -> Vec<(&'static str, Slot)> {
                vec![ $( ($key, Slot::new::<$ty>($default)), )* ]
            }

            $(
                $(#[$meta])*
                pub fn $getter(&self) -> Result<$ty> {
                    self.observer.get_value::<$ty>($key)
                }

                pub fn $setter(&self, value: $ty) -> Result<()> {
                    self.observer.set_value::<$ty>($key, value)
                }
            )*
        }
    };
}

macro_rules! color_params {
    ($( $rgba:ident, $set_rgba:ident => $getter:ident, $setter:ident; )*) => {
        impl ViewParams {
            $(
                pub fn $rgba(&self) -> Result<Color> {
                    self.$getter().map(Color::from_packed)
                }

                pub fn $set_rgba(&self, color: Color) -> Result<()> {
                    self.$setter(color.to_packed())
                }
            )*
        }
    };
}

view_params! {
    "UseNewSelection" => use_new_selection, set_use_new_selection: bool = true;
    "UseSelectionRoot" => use_selection_root, set_use_selection_root: bool = true;
    "EnableSelection" => enable_selection, set_enable_selection: bool = true;
    /// Render caching mode; 0 lets the renderer decide.
    "RenderCache" => render_cache, set_render_cache: i64 = 0;
    "RandomColor" => random_color, set_random_color: bool = false;
    "BoundingBoxColor" => bounding_box_color, set_bounding_box_color: u64 = 0xFFFF_FFFF;
    "AnnotationTextColor" => annotation_text_color, set_annotation_text_color: u64 = 0xFFFF_FFFF;
    "MarkerSize" => marker_size, set_marker_size: i64 = 9;
    "DefaultLinkColor" => default_link_color, set_default_link_color: u64 = 0x66FF_FFFF;
    "DefaultShapeLineColor" => default_shape_line_color, set_default_shape_line_color: u64 = 0x1919_19FF;
    "DefaultShapeVertexColor" => default_shape_vertex_color, set_default_shape_vertex_color: u64 = 0x1919_19FF;
    "DefaultShapeColor" => default_shape_color, set_default_shape_color: u64 = 0xCCCC_CCFF;
    "DefaultShapeLineWidth" => default_shape_line_width, set_default_shape_line_width: i64 = 2;
    "DefaultShapePointSize" => default_shape_point_size, set_default_shape_point_size: i64 = 2;
    "CoinCycleCheck" => coin_cycle_check, set_coin_cycle_check: bool = true;
    "EnablePropertyViewForInactiveDocument" => enable_property_view_for_inactive_document,
        set_enable_property_view_for_inactive_document: bool = true;
    "ShowSelectionBoundingBox" => show_selection_bounding_box, set_show_selection_bounding_box: bool = false;
    /// Font size for view annotations; 0 uses the platform size.
    "DefaultFontSize" => default_font_size, set_default_font_size: i64 = 0;
}

color_params! {
    bounding_box_rgba, set_bounding_box_rgba => bounding_box_color, set_bounding_box_color;
    annotation_text_rgba, set_annotation_text_rgba => annotation_text_color, set_annotation_text_color;
    default_link_rgba, set_default_link_rgba => default_link_color, set_default_link_color;
    default_shape_line_rgba, set_default_shape_line_rgba => default_shape_line_color, set_default_shape_line_color;
    default_shape_vertex_rgba, set_default_shape_vertex_rgba => default_shape_vertex_color, set_default_shape_vertex_color;
    default_shape_rgba, set_default_shape_rgba => default_shape_color, set_default_shape_color;
}

impl ViewParams {
    /// Build view parameters on `group`: attach, register, then load the
    /// current values.
    pub fn new(group: Arc<ParameterGroup>) -> Result<Self> {
        let observer = Self::slots()
            .into_iter()
            .fold(ParameterObserverBuilder::new(group), |builder, (key, slot)| {
                builder.with_parameter(key, slot)
            })
            .build()?;
        Ok(Self { observer })
    }

    /// Build view parameters on the view group of `store`.
    pub fn from_store(store: &ParameterStore) -> Result<Self> {
        Self::new(store.group_by_path(VIEW_PARAMS_PATH))
    }

    /// The process-wide view parameters, bound to [`ParameterStore::global`].
    ///
    /// Created on first access; the first successful construction wins.
    pub fn instance() -> Result<&'static ViewParams> {
        static INSTANCE: OnceLock<ViewParams> = OnceLock::new();
        if let Some(view) = INSTANCE.get() {
            return Ok(view);
        }
        let view = Self::from_store(ParameterStore::global())?;
        info!("[PARAMS] View parameters initialized");
        Ok(INSTANCE.get_or_init(|| view))
    }

    /// Every view parameter, in registration order.
    pub fn catalog() -> &'static [ViewParameter] {
        CATALOG
    }

    pub fn observer(&self) -> &Arc<ParameterObserver> {
        &self.observer
    }

    pub fn group(&self) -> &Arc<ParameterGroup> {
        self.observer.group()
    }
}
