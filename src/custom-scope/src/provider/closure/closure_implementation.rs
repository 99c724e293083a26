use std::error::Error;

use crate::container::resolver::{Context, ResolveError};
use crate::container::Managed;
use crate::key;
use crate::provider::closure::Closure;

impl<F, T, E> Closure<()> for F
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Managed,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    type Constructed = T;

    type Error = E;

    fn run(
        &self,
        _context: &Context,
    ) -> Result<Result<Self::Constructed, Self::Error>, ResolveError> {
        Ok(self())
    }
}

macro_rules! for_all_tuples {
    ($implementation:ident) => {
        $implementation!(D1);
        $implementation!(D1, D2);
        $implementation!(D1, D2, D3);
        $implementation!(D1, D2, D3, D4);
        $implementation!(D1, D2, D3, D4, D5);
        $implementation!(D1, D2, D3, D4, D5, D6);
        $implementation!(D1, D2, D3, D4, D5, D6, D7);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13, D14);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13, D14, D15);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12, D13, D14, D15, D16);
    };
}

macro_rules! impl_closure {
    ($($dep:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, T, E, $($dep,)*> Closure<($($dep,)*)> for F
        where
            F: Fn($($dep,)*) -> Result<T, E> + Send + Sync + 'static,
            T: Managed,
            E: Into<Box<dyn Error + Send + Sync>>,
            $($dep: Managed,)*
        {
            type Constructed = T;

            type Error = E;

            fn run(
                &self,
                context: &Context,
            ) -> Result<Result<Self::Constructed, Self::Error>, ResolveError> {
                $(
                    let $dep = context.get(key::of::<$dep>())?;
                )*
                Ok(self($($dep,)*))
            }
        }
    };
}

for_all_tuples!(impl_closure);

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use crate::container::resolver::MockResolver;
    use crate::provider::testing::make_context;

    use super::*;

    #[test]
    fn closure_run_resolves_each_argument_as_dependency() {
        let mut kernel = MockResolver::new();
        kernel
            .expect_resolve()
            .times(2)
            .withf(|request| request.depth() == 1)
            .returning(|request| {
                if request.service().name() == "i32" {
                    Ok(vec![Box::new(2i32) as Box<dyn Managed>])
                } else {
                    Ok(vec![Box::new(3i64) as Box<dyn Managed>])
                }
            });
        let context = make_context(kernel, key::of::<i64>(), Vec::new());

        let closure = |a: i32, b: i64| Ok::<_, Infallible>(i64::from(a) * b);
        assert_eq!(closure.run(&context).unwrap().unwrap(), 6);
    }

    #[test]
    fn closure_run_without_arguments_succeeds() {
        let context = make_context(MockResolver::new(), key::of::<&str>(), Vec::new());

        let closure = || Ok::<_, Infallible>("str");
        assert_eq!(closure.run(&context).unwrap().unwrap(), "str");
    }
}
