/*!
# Scorecard

A small multi-page web form application, built in Rust: users sign up, log
in, enter their marks for a fixed set of subjects, and view auto-generated
charts of those marks.

## Architecture

Server-rendered pages over HTTP:

### Web Layer
- **Technologies**: axum, embedded HTML templates
- **Key Components**:
  - Page handlers - Serve the login, sign-up, marks, and report pages
  - Form handlers - Run one page-flow action per button press and redirect
  - Chart endpoint - Streams the report charts as PNG images
  - Session cookie plumbing - Binds browsers to their navigation state

### Core
- **Page Flow** - An explicit action dispatch over the four-page navigation
  state machine (login, sign-up, marks, report)
- **Credential Store** - One JSON record per user, keyed by the local part
  of the email address
- **Marks Store** - A `Subject,Marks` CSV per user for the fixed subject
  set {English, Math, Science}
- **Report** - Arithmetic mean plus three declarative chart specifications
  (average bar, per-subject line, per-subject pie)
- **Chart Rendering** - plotters-based PNG generation

### Data Persistence Layer
- Flat files under a data directory, one folder per identity key
- A small `Store` interface (`exists`/`get`/`put`) keeps the backend
  swappable

## Modules

- **store**: Storage backend interface and the filesystem implementation
- **credentials**: User records and identity-key derivation
- **marks**: The fixed three-subject marks table
- **session**: Pages, per-browser sessions, and the session registry
- **pages**: The action-to-transition page flow
- **report**: Report computation and chart specifications
- **graph**: Chart rendering with plotters
- **app**: Routing, handlers, and server startup
*/

pub mod app;
pub mod credentials;
pub mod graph;
pub mod marks;
pub mod pages;
pub mod report;
pub mod session;
pub mod store;

/// Re-export everything from these modules to make it easier to use
pub use credentials::*;
pub use graph::*;
pub use marks::*;
pub use pages::*;
pub use report::*;
pub use session::*;
pub use store::*;
