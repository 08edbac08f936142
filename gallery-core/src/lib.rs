pub mod error;

pub mod config;

pub mod logging;

pub mod model {
    pub mod item;
    pub use item::{Folder, GridEntry, Id, Item, ItemActionButton, MediaKind};

    pub mod selection;
    pub use selection::Selection;

    pub mod capabilities;
    pub use capabilities::Capabilities;

    pub mod workflow;
    pub use workflow::{
        FieldKind, FieldSchema, FormState, PendingAction, PluginMode, SelectOption, SelectionRule,
        Workflow, WorkflowKind, WorkflowSlot,
    };

    pub mod generation;
    pub use generation::{GenerationState, GenerationTracker};

    pub mod state;
    pub use state::{GalleryState, Toast, ToastLevel};
}

pub mod source {
    pub mod data_source;
    pub use data_source::{
        DataSource, SourceCapabilities, SourceContext, SourceError, UploadRequest,
    };

    pub mod memory;
    pub use memory::MemoryDataSource;
}

pub mod controller {
    pub mod actions;
    pub use actions::{ItemAction, PanelAction, ToolbarActionId};

    pub mod events;
    pub use events::{
        GalleryEvent, GalleryNotification, GridEvent, ModalButton, ModalEvent, NavEvent,
        ToolbarEvent,
    };

    pub mod orchestrator;
    pub use orchestrator::{Gallery, GalleryOptions};

    pub mod event_loop;
    pub use event_loop::EventLoop;
}

pub mod view {
    pub mod theme;

    pub mod components {
        pub mod modal;
        pub use modal::ModalDialog;
        pub mod toolbar;
        pub use toolbar::{Toolbar, ToolbarItem};
        pub mod items_grid;
        pub use items_grid::{GridDirection, GridOptions, ItemsGrid};
        pub mod navigation_list;
        pub use navigation_list::NavigationList;
        pub mod toast;
        pub use toast::ToastOverlay;
    }

    pub use components::*;
}

pub mod plugins {
    pub mod contract;
    pub use contract::{GalleryPlugin, PluginCommand, PluginHooks, PluginHost};

    pub mod generate;
    pub use generate::GenerationPlugin;

    pub mod import;
    pub use import::{ImportFile, ImportPlugin};
}

pub use config::GalleryConfig;
pub use error::GalleryError;
pub use logging::Logger;
