/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::Once;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod messages;
pub mod operations;

static INIT: Once = Once::new();

/// Routes test logs to `logs/bizop_tests.txt`, once per test binary.
///
/// `RUST_LOG` overrides the default `bizop=trace` filter.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let appender = RollingFileAppender::new(Rotation::NEVER, "logs", "bizop_tests.txt");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        // the writer stops flushing once the guard drops
        Box::leak(Box::new(guard));

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bizop=trace,warn"));

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::CLOSE)
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_line_number(true)
            .with_thread_names(true)
            .with_env_filter(filter)
            .with_writer(writer)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}
