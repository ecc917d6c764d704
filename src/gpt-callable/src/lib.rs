//! Wrap plain functions into GPT-callable tools.
//!
//! A wrapped function stays directly invokable and additionally carries a
//! [`FunctionSchema`] describing its name, description, and parameter shape,
//! ready to be passed to an LLM function-calling API.
//!
//! ```
//! use gpt_callable::{GptCallable, ParamSpec, ParamType, Signature};
//! use serde_json::json;
//!
//! let signature = Signature::new()
//!     .param(
//!         ParamSpec::new("location", ParamType::String)
//!             .description("The city and state, e.g. San Francisco, CA"),
//!     )
//!     .param(ParamSpec::new(
//!         "unit",
//!         ParamType::enumeration(["celsius", "fahrenheit"]),
//!     ));
//!
//! let get_current_weather = GptCallable::new()
//!     .description("Get the current weather in a given location")
//!     .exclude("unit")
//!     .wrap("get_current_weather", signature, |args| {
//!         Ok(json!({"location": args["location"], "temperature": 21}))
//!     })
//!     .unwrap();
//!
//! let tools = vec![get_current_weather.gpt_func()];
//! assert_eq!(tools[0].name, "get_current_weather");
//! ```

use std::collections::BTreeSet;
use std::future::Future;

use futures::future::BoxFuture;
use serde_json::Value;

pub mod schema;

pub use schema::{FunctionSchema, ParamKind, ParamSpec, ParamType, SchemaError, Signature};

/// Result of invoking a wrapped function. Errors from the underlying function
/// propagate unchanged.
pub type CallResult = Result<Value, anyhow::Error>;

/// A synchronous function paired with its generated schema.
pub struct GptFunction {
    func: Box<dyn Fn(Value) -> CallResult + Send + Sync>,
    gpt_func: FunctionSchema,
}

impl GptFunction {
    /// Forward a call to the underlying function.
    pub fn call(&self, args: Value) -> CallResult {
        (self.func)(args)
    }

    /// The attached schema, for use in a function-calling request.
    pub fn gpt_func(&self) -> &FunctionSchema {
        &self.gpt_func
    }
}

/// An asynchronous function paired with its generated schema. Calling it
/// returns the underlying function's future unchanged; the wrapper adds no
/// scheduling of its own.
pub struct AsyncGptFunction {
    func: Box<dyn Fn(Value) -> BoxFuture<'static, CallResult> + Send + Sync>,
    gpt_func: FunctionSchema,
}

impl AsyncGptFunction {
    /// Forward a call to the underlying function, yielding its pending
    /// result.
    pub fn call(&self, args: Value) -> BoxFuture<'static, CallResult> {
        (self.func)(args)
    }

    /// The attached schema, for use in a function-calling request.
    pub fn gpt_func(&self) -> &FunctionSchema {
        &self.gpt_func
    }
}

/// Configuration captured before wrapping a function.
///
/// The `description` overrides the schema description, falling back to the
/// signature's doc string and then to the function's name. `include` forces
/// parameters with defaults into the required set, `exclude` omits parameters
/// from the schema entirely.
#[derive(Debug, Clone, Default)]
pub struct GptCallable {
    description: Option<String>,
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl GptCallable {
    pub fn new() -> Self {
        GptCallable::default()
    }

    /// Description of the wrapped function's purpose, for the language model.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark a parameter that has a default value as required.
    pub fn include(mut self, name: impl Into<String>) -> Self {
        self.include.insert(name.into());
        self
    }

    /// Omit a parameter from the generated schema entirely.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.insert(name.into());
        self
    }

    /// Wrap a synchronous function. Fails eagerly if the include/exclude
    /// configuration doesn't match the signature; no wrapper is produced in
    /// that case.
    pub fn wrap<F>(
        self,
        name: &str,
        signature: Signature,
        func: F,
    ) -> Result<GptFunction, SchemaError>
    where
        F: Fn(Value) -> CallResult + Send + Sync + 'static,
    {
        let gpt_func = self.build_schema(name, &signature)?;
        Ok(GptFunction {
            func: Box::new(func),
            gpt_func,
        })
    }

    /// Wrap an asynchronous function. The returned wrapper yields the
    /// underlying future to the caller on each invocation.
    pub fn wrap_async<F, Fut>(
        self,
        name: &str,
        signature: Signature,
        func: F,
    ) -> Result<AsyncGptFunction, SchemaError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallResult> + Send + 'static,
    {
        let gpt_func = self.build_schema(name, &signature)?;
        Ok(AsyncGptFunction {
            func: Box::new(move |args| Box::pin(func(args))),
            gpt_func,
        })
    }

    fn build_schema(&self, name: &str, signature: &Signature) -> Result<FunctionSchema, SchemaError> {
        let parameters = schema::build_parameters(signature, &self.include, &self.exclude)?;
        let description = self
            .description
            .clone()
            .or_else(|| signature.doc_string().map(str::to_string))
            .unwrap_or_else(|| name.to_string());

        tracing::debug!(function = name, "built schema for wrapped function");

        Ok(FunctionSchema {
            name: name.to_string(),
            description,
            parameters,
        })
    }
}
